pub mod errors;
pub mod inspect;
pub mod replay;
pub mod run;
