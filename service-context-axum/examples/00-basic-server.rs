use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use service_context::config::ContextConfig;
use service_context::context::ServiceContext;
use service_context_axum::component::AxumComponent;
use service_context_axum::fault::Fault;

async fn hello_world() -> &'static str {
    "Hello world!"
}

// faults can be returned as errors...
async fn find_user(Path(user_id): Path<u32>) -> Result<String, Fault> {
    if user_id == 0 {
        return Err(Fault::with_status(StatusCode::NOT_FOUND, "user not found"));
    }

    Ok(format!("Hello user {user_id}!"))
}

// ...or raised, in which case they get recovered into the same kind of response
async fn admin() -> &'static str {
    Fault::with_status(StatusCode::FORBIDDEN, "admins only").raise()
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
#[tokio::main]
async fn main() {
    // settings come from service-context.json and SCTX_* variables, e.g. SCTX_LOG_LEVEL=debug
    let config = ContextConfig::init_from_environment().expect("unable to read config");

    let router = Router::new()
        .route("/", get(hello_world))
        .route("/users/:user_id", get(find_user))
        .route("/admin", get(admin));

    let mut context = ServiceContext::builder()
        .with_config(&config)
        .with_component(AxumComponent::new("api", router))
        .build()
        .expect("unable to build context");

    // listens on the address from "web.api.listen_address", 0.0.0.0:4000 by default
    context.load().expect("unable to load components");

    tokio::signal::ctrl_c()
        .await
        .expect("unable to listen for ctrl-c");

    context.stop().expect("unable to stop components");
}
