use apigw_adapter::{run_lambda, Adapter, AdapterConfig};
use echo::EchoHandler;
use env_logger::Env;

#[tokio::main]
pub async fn main() -> Result<(), lambda_runtime::Error> {
  env_logger::init_from_env(Env::default().filter_or("RUST_LOG", "info"));

  // Binary media types (e.g., `image/png,application/pdf`) are configured per deployment.
  let config = AdapterConfig::from_env_var("BINARY_CONTENT_TYPES");

  run_lambda(Adapter::new(EchoHandler, config)).await
}
