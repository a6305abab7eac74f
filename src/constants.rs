//! Global Constants
//!
//! Fixed phrases and labels the documentation generator emits. Matching is
//! exact, including the em-dash and trailing space in the base-class
//! markers.

/// Base-class marker paragraphs preceding a class entry
pub mod markers {
    /// Singular form: `<paragraph>base class — ...</paragraph>`
    pub const BASE_CLASS_SINGULAR: &str = "base class \u{2014} ";

    /// Plural form: `<paragraph>base classes — ...</paragraph>`
    pub const BASE_CLASS_PLURAL: &str = "base classes \u{2014} ";
}

/// Field-list labels recognized inside entity content
pub mod fields {
    /// Data type of a constant or attribute
    pub const TYPE: &str = "Type";

    /// Documented parameter list of a function
    pub const PARAMETERS: &str = "Parameters";

    /// Return type of a function
    pub const RETURN_TYPE: &str = "Return type";

    /// Return description of a function
    pub const RETURNS: &str = "Returns";
}
