use crate::backup::result_error::error::Error;
use crate::backup::result_error::{Categorize, WithDebugObjectAndFnName, WithMsg};
use std::fmt::Debug;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

impl<S: Into<String>, O: Debug + Send + 'static, R> WithDebugObjectAndFnName<S, O> for Result<R> {
    fn with_debug_object_and_fn_name(self, obj: O, fn_name: S) -> Self {
        self.map_err(|e| e.with_debug_object_and_fn_name(obj, fn_name))
    }
}

impl<R, S: Into<String>> WithMsg<S> for Result<R> {
    fn with_msg(self, msg: S) -> Self {
        self.map_err(|e| e.with_msg(msg))
    }
}

impl<R> Categorize for Result<R> {
    fn into_configuration(self) -> Self {
        self.map_err(Error::into_configuration)
    }

    fn into_destination_access<P: Into<PathBuf>>(self, path: P) -> Self {
        self.map_err(|e| e.into_destination_access(path))
    }

    fn into_archive_write<P: Into<PathBuf>>(self, path: P) -> Self {
        self.map_err(|e| e.into_archive_write(path))
    }
}
