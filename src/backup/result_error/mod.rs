use std::fmt::Debug;
pub mod error;
pub mod result;

pub trait WithDebugObjectAndFnName<S: Into<String>, O: Debug + 'static> {
    fn with_debug_object_and_fn_name(self, obj: O, fn_name: S) -> Self;
}

pub trait WithMsg<S: Into<String>> {
    fn with_msg(self, msg: S) -> Self;
}

/// Moves an error into one of the reported failure categories.
pub trait Categorize {
    fn into_configuration(self) -> Self;
    fn into_destination_access<P: Into<std::path::PathBuf>>(self, path: P) -> Self;
    fn into_archive_write<P: Into<std::path::PathBuf>>(self, path: P) -> Self;
}
