use crate::error::format_error;
use crate::{Adapter, Handler};

use futures::future;
use lambda_runtime::{service_fn, LambdaEvent};
use serde_json::Value;

/// Start the Lambda runtime to handle API Gateway proxy events with the specified adapter.
///
/// Each event is handled by [`Adapter::handle`]. Any [`AdapterError`](crate::AdapterError) is
/// logged (including its chain of causes and a stack trace) and reported to the Lambda runtime as a
/// failed invocation.
///
/// # Example
///
/// ```rust,ignore
/// use apigw_adapter::{run_lambda, Adapter, AdapterConfig};
///
/// #[tokio::main]
/// pub async fn main() -> Result<(), lambda_runtime::Error> {
///   env_logger::init();
///
///   let handler = ...; // Instantiate your handler here.
///   let config = AdapterConfig::from_env_var("BINARY_CONTENT_TYPES");
///
///   run_lambda(Adapter::new(handler, config)).await
/// }
/// ```
pub async fn run_lambda<H>(adapter: Adapter<H>) -> Result<(), lambda_runtime::Error>
where
  H: Handler,
{
  lambda_runtime::run(service_fn(|event: LambdaEvent<Value>| {
    let (payload, context) = event.into_parts();
    let request_id = context.request_id.clone();
    future::ready(
      adapter
        .handle(payload, context)
        .map_err(|err| -> lambda_runtime::Error {
          log::error!(
            "Request {request_id} failed: {}",
            format_error(&err, Some(&format!("AdapterError::{}", err.name())), err.backtrace()),
          );
          err.into()
        }),
    )
  }))
  .await
}
