pub mod error;
pub mod info;

pub use error::{Result, StubError};
pub use info::{
    AnalysisResult, ClassInfo, DataType, FunctionInfo, Info, InfoKind, ParameterDetailInfo,
    ReturnInfo, SectionInfo, VariableInfo,
};
