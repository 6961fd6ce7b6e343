use std::{sync::Arc, time::SystemTime};

use wirebox::*;

// Define regular traits and implementor structs

trait Logger: Send + Sync {
    fn log(&self, content: &str);
}

trait DateLogger: Send + Sync {
    fn log_date(&self);
}

#[derive(Default)]
struct LoggerImpl;

impl Logger for LoggerImpl {
    fn log(&self, content: &str) {
        println!("{}", content);
    }
}

struct DateLoggerImpl {
    logger: Arc<dyn Logger>,
}

impl DateLoggerImpl {
    fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }
}

impl DateLogger for DateLoggerImpl {
    fn log_date(&self) {
        let secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        self.logger.log(&format!("{}s since epoch", secs));
    }
}

// Describe how both implementors are built
autowire!(dyn Logger: LoggerImpl);
autowire!(dyn DateLogger: DateLoggerImpl, new, logger: Arc<dyn Logger> = "logger");

/// Registers the logging services only when one of them is requested
struct LogProvider;

impl Provider for LogProvider {
    fn is_deferred(&self) -> bool {
        true
    }

    fn provides(&self) -> Vec<String> {
        vec!["logger".to_string(), "date_logger".to_string()]
    }

    fn register(&self, container: &Container) {
        container.register::<LoggerImpl>();
        container.register::<DateLoggerImpl>();
        container.share("logger", Producer::class("LoggerImpl"), BindOptions::new());
        container.share(
            "date_logger",
            Producer::class("DateLoggerImpl"),
            BindOptions::new().alias("clock"),
        );
    }
}

fn main() -> Result<(), WiringError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let container = Container::new();
    container.add_provider(Arc::new(LogProvider));

    let b: Arc<dyn DateLogger> = container.inject("date_logger")?;
    b.log_date();

    let c: Arc<dyn DateLogger> = container.inject("clock")?;
    c.log_date();

    println!("{:#?}", container);
    Ok(())
}
