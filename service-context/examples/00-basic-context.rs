use service_context::component::{Component, ErrorPtr};
use service_context::context::{ServiceContext, ShutdownOrder};
use service_context::log::info;
use std::sync::atomic::{AtomicU64, Ordering};

// a simple component keeping some shared state
#[derive(Default)]
struct Counter {
    value: AtomicU64,
}

impl Component for Counter {
    fn id(&self) -> &str {
        "counter"
    }

    fn activate(&self, context: &ServiceContext) -> Result<(), ErrorPtr> {
        info!(context.logger("counter"), "Counter ready");
        Ok(())
    }

    fn stop(&self) -> Result<(), ErrorPtr> {
        println!("Final count: {}", self.value.load(Ordering::SeqCst));
        Ok(())
    }
}

// components registered later can look up the ones registered earlier
struct Greeter;

impl Component for Greeter {
    fn id(&self) -> &str {
        "greeter"
    }

    fn activate(&self, context: &ServiceContext) -> Result<(), ErrorPtr> {
        let counter = context.must_get_typed::<Counter>("counter");
        counter.value.fetch_add(1, Ordering::SeqCst);

        let logger = context
            .logger("greeter")
            .with_field("env", context.environment().to_string());
        info!(logger, "Hello world!");
        Ok(())
    }

    fn stop(&self) -> Result<(), ErrorPtr> {
        Ok(())
    }
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    let mut context = ServiceContext::builder()
        .with_name("example")
        .with_shutdown_order(ShutdownOrder::Reverse)
        .with_component(Counter::default())
        .with_component(Greeter)
        .build()
        .expect("unable to build context");

    // activates the logger, counter and greeter, in that order
    context.load().expect("unable to load components");

    // stops the greeter, counter and logger, in that order
    context.stop().expect("unable to stop components");
}
