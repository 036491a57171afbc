macro_rules! function_path {
    () => {
        concat!(module_path!(), "::", function_name!(), " ", file!(), ":", line!())
    };
}

pub(crate) use function_path;

pub mod archive;
pub mod backup_config;
pub mod ini;
pub mod result_error;
pub mod source;
pub mod task;
pub mod validate;
pub mod zip;
