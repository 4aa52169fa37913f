use std::fmt;
use thiserror::Error;

use crate::list_protocol::ListSession;

type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure reported by a device command sink.
///
/// The driver never looks inside; it is handed back to the caller as is.
#[derive(Debug)]
pub struct DeviceError(BoxedError);

impl DeviceError
{
    pub fn new<E>(err: E) -> DeviceError
        where E: Into<BoxedError>
    {
        DeviceError(err.into())
    }

    pub fn inner(&self) -> &(dyn std::error::Error + Send + Sync + 'static)
    {
        &*self.0
    }
}

impl fmt::Display for DeviceError
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for DeviceError
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.0)
    }
}

#[derive(Error, Debug)]
pub enum Error
{
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    #[error("invalid value for {setting}: {reason}")]
    InvalidParameter { setting: String, reason: String },

    #[error("{operation} not allowed while {state}")]
    ProtocolViolation { operation: &'static str, state: ListSession },

    #[error("device call failed: {0}")]
    DeviceIo(#[source] DeviceError),

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

impl Error
{
    pub fn invalid_parameter(setting: &str, reason: impl Into<String>) -> Error
    {
        Error::InvalidParameter {
            setting: setting.to_string(),
            reason: reason.into()
        }
    }
}

impl From<DeviceError> for Error
{
    fn from(e: DeviceError) -> Error {
        Error::DeviceIo(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// A vendor-file statement that was recognised by name but whose arguments
/// could not be extracted. Collected and logged, never returned as `Err`.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("line {line}: skipped {statement}: {reason}")]
pub struct ParseSkipped
{
    pub line: usize,
    pub statement: String,
    pub reason: String,
}

#[test]
fn test_device_error_source_chain()
{
    use std::error::Error as _;
    use std::io;

    let dev = DeviceError::new(io::Error::new(io::ErrorKind::TimedOut, "no reply"));
    let kind = dev.inner().downcast_ref::<io::Error>().map(|e| e.kind());
    assert_eq!(kind, Some(io::ErrorKind::TimedOut));

    let err = Error::from(dev);
    assert_eq!(err.to_string(), "device call failed: no reply");
    let wrapped = err.source().unwrap();
    assert!(wrapped.is::<DeviceError>());
    let cause = wrapped.source().unwrap();
    assert!(cause.is::<io::Error>());
    assert!(cause.source().is_none());
}
