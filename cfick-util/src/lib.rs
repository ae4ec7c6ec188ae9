#![warn(clippy::all)]

use lazy_static::lazy_static;

pub mod abs_path;
pub mod console;
mod error;
mod macros;
pub mod model;
pub mod service;

pub use error::CfError;

use crate::abs_path::AbsPathBuf;

pub type Error = anyhow::Error;
pub type Result<T> = anyhow::Result<T>;

lazy_static! {
    pub static ref DATA_LOCAL_DIR: AbsPathBuf = {
        let data_local_dir = dirs::data_local_dir().expect("Could not get data local dir");
        AbsPathBuf::try_new(data_local_dir)
            .expect("data local dir must be absolute")
            .join("cfick")
    };
}
