use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::{fmt, sync::RwLock};

use crate::Error;

type Hook = fn(&Error) -> ErrorReport;

lazy_static! {
    static ref HOOK: RwLock<Option<Hook>> = RwLock::new(None);
}

/// A computer-readable report of an unhandled error.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorReport {
    /// The type of the error passed to the Lambda APIs.
    pub name: String,
    /// The [std::fmt::Display] output of the error.
    pub err: String,
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.err)
    }
}

impl std::error::Error for ErrorReport {}

fn default_error_hook(err: &Error) -> ErrorReport {
    ErrorReport {
        name: String::from("UnknownError"),
        err: format!("{}", err),
    }
}

/// Turns an error that escaped every middleware into an [`ErrorReport`].
///
/// Called by [`run`](crate::run) before the failure is handed back to the
/// Lambda runtime.
pub(crate) fn generate_report(err: &Error) -> ErrorReport {
    let hook = match HOOK.read() {
        Ok(hook) => *hook,
        Err(poisoned) => *poisoned.into_inner(),
    };
    hook.unwrap_or(default_error_hook)(err)
}

/// Registers a custom error hook, replacing any that was previously registered.
///
/// The hook is invoked when a [`Handler`](crate::Handler) served by
/// [`run`](crate::run) returns an error that no middleware recovered, prior to
/// the runtime reporting the error to the Lambda Runtime APIs.
///
/// # Example
/// ```
/// use lambda_decorators::{error_hook::{self, ErrorReport}, DecoratorError, Error};
///
/// fn error_hook(e: &Error) -> ErrorReport {
///     let name = match DecoratorError::find(e) {
///         Some(_) => "DecoratorError",
///         None => "HandlerError",
///     };
///     ErrorReport {
///         name: String::from(name),
///         err: format!("{}", e),
///     }
/// }
///
/// error_hook::set_error_hook(error_hook);
/// ```
pub fn set_error_hook(hook: fn(&Error) -> ErrorReport) {
    match HOOK.write() {
        Ok(mut slot) => *slot = Some(hook),
        Err(poisoned) => *poisoned.into_inner() = Some(hook),
    }
}

#[test]
fn set_err_hook() {
    use crate::err_fmt;

    let e: Error = err_fmt!("An error").into();
    assert_eq!(String::from("UnknownError"), default_error_hook(&e).name);

    set_error_hook(|err: &Error| {
        if let Some(e) = err.downcast_ref::<std::io::Error>() {
            ErrorReport {
                name: String::from("std::io::Error"),
                err: format!("{}", e),
            }
        } else {
            default_error_hook(err)
        }
    });

    let e = generate_report(&e);
    assert_eq!(String::from("UnknownError"), e.name);
    assert_eq!("UnknownError: An error", e.to_string());

    let io: Error = Box::new(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
    assert_eq!(String::from("std::io::Error"), generate_report(&io).name);
}
