use std::{borrow::Cow, sync::Arc};

use sentry::{
    ClientInitGuard,
    integrations::tracing::EventFilter,
    protocol::{Event, Exception, Values},
    types::Dsn,
};
use tracing_subscriber::{Layer, registry::LookupSpan};

/// Sentry reporting of WARN and ERROR events.
#[derive(Debug)]
pub struct Sentry {
    url: Dsn,
    environment: Option<String>,
    release: Option<String>,
}

impl Sentry {
    pub fn new(url: &str) -> Result<Self, sentry::types::ParseDsnError> {
        Ok(Self {
            url: url.parse()?,
            environment: None,
            release: None,
        })
    }

    pub fn with_release(mut self, release: Option<String>) -> Self {
        self.release = release;
        self
    }

    pub fn with_environment(mut self, environment: Option<String>) -> Self {
        self.environment = environment;
        self
    }

    pub fn layer<S>(&self) -> impl Layer<S>
    where
        S: tracing::Subscriber + for<'span> LookupSpan<'span> + Send + Sync,
    {
        sentry::integrations::tracing::layer()
            .event_filter(|metadata| match *metadata.level() {
                tracing::Level::ERROR | tracing::Level::WARN => EventFilter::Event,
                _ => EventFilter::Ignore,
            })
            .span_filter(|metadata| {
                matches!(
                    *metadata.level(),
                    tracing::Level::ERROR | tracing::Level::WARN
                )
            })
    }

    /// Initializes the Sentry client. Events are flushed when the guard is dropped.
    pub fn install(self) -> ClientInitGuard {
        let options = sentry::ClientOptions {
            release: self.release.map(Cow::from),
            environment: self.environment.map(Cow::from),
            attach_stacktrace: true,
            before_send: Some(Arc::new(|mut event: Event<'static>| {
                event
                    .tags
                    .insert("component".to_owned(), "aggregation-prover".to_owned());
                // Message-only events are grouped by their level otherwise.
                if event.exception.is_empty() {
                    event.exception = Values::from(vec![Exception {
                        ty: event.level.to_string(),
                        value: event.message.clone(),
                        ..Default::default()
                    }]);
                }
                Some(event)
            })),
            ..Default::default()
        };

        sentry::init((self.url, options))
    }
}
