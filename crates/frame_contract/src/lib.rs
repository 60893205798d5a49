//! Frame Contract
//!
//! Call-time contracts for functions that take and return data frames.
//!
//! A function is described by a [`ContractFn`] (body plus [`Signature`]).
//! [`argument`] and [`result`] wrap it with checks on one argument or on the
//! return value:
//!
//! - schema conformance ([`DataFrameSchema`], [`SeriesSchema`])
//! - relations to other arguments ([`checks::same_index_as`],
//!   [`checks::same_length_as`], [`checks::extends`])
//! - object identity ([`checks::is_`], [`checks::is_not`])
//! - column removal ([`checks::removed`])
//!
//! Whether violations are ignored, logged or returned as errors is decided
//! by the current [`Mode`], which defaults to silent and can be set through
//! the `FRAME_CONTRACT_MODE` environment variable, [`set_mode`], or a scoped
//! guard such as [`raise_scope`].

pub mod checks;
pub mod config;
pub mod decorator;
pub mod error;
pub mod fingerprint;
pub mod mode;
pub mod params;

pub use checks::{Check, IntoCheck};
pub use config::{ContractConfig, MODE_ENV};
pub use decorator::{argument, result, ArgumentContract, Key, ResultContract};
pub use error::{ContractError, Result};
pub use mode::{
    get_mode, raise_scope, scoped_mode, set_mode, silent_scope, with_mode, Mode, ModeGuard,
};
pub use params::{from_arg, from_parameter, Call, CallArgs, ContractFn, FromArg, Signature};

pub use frame_contract_data as data;
pub use frame_contract_data::{
    Column, ColumnKey, DataFrameSchema, DataType, Frame, FrameRef, ItemKey, Schema, Series,
    SeriesRef, SeriesSchema, ValidateOptions, Value,
};
