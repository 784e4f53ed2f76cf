//! Shared test utilities used across sisstat crates.

pub mod tracing {
    //! Recording layer for asserting spans and events emitted by the solver.
    use std::collections::HashMap;
    use std::fmt;
    use std::sync::{Arc, Mutex, MutexGuard};

    use tracing::field::{Field, Visit};
    use tracing::span::{Attributes, Id, Record};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::Layer;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::registry::{LookupSpan, Registry};

    /// Captures closed spans and emitted events so tests can assert on
    /// instrumentation without parsing formatted log output.
    #[derive(Clone, Default)]
    pub struct RecordingLayer {
        log: Arc<Mutex<Log>>,
    }

    #[derive(Default)]
    struct Log {
        spans: Vec<SpanRecord>,
        events: Vec<EventRecord>,
    }

    impl RecordingLayer {
        fn log(&self) -> MutexGuard<'_, Log> {
            self.log.lock().expect("recording lock poisoned")
        }

        /// Closed spans in completion order.
        ///
        /// # Examples
        /// ```
        /// use sisstat_test_support::tracing::RecordingLayer;
        ///
        /// assert!(RecordingLayer::default().spans().is_empty());
        /// ```
        #[must_use]
        pub fn spans(&self) -> Vec<SpanRecord> {
            self.log().spans.clone()
        }

        /// Emitted events in emission order.
        #[must_use]
        pub fn events(&self) -> Vec<EventRecord> {
            self.log().events.clone()
        }

        /// Closed spans called `name`.
        #[must_use]
        pub fn spans_named(&self, name: &str) -> Vec<SpanRecord> {
            self.log()
                .spans
                .iter()
                .filter(|span| span.name == name)
                .cloned()
                .collect()
        }

        /// Events at `level` whose message equals `message`.
        #[must_use]
        pub fn events_with_message(&self, level: Level, message: &str) -> Vec<EventRecord> {
            self.log()
                .events
                .iter()
                .filter(|event| event.level == level && event.message() == Some(message))
                .cloned()
                .collect()
        }
    }

    /// Runs `f` with a subscriber that only feeds a fresh [`RecordingLayer`],
    /// returning the closure's output alongside the layer.
    ///
    /// # Examples
    /// ```
    /// use sisstat_test_support::tracing::record;
    ///
    /// let (value, layer) = record(|| {
    ///     tracing::info!(answer = 42, "computed");
    ///     42
    /// });
    /// assert_eq!(value, 42);
    /// assert_eq!(layer.events()[0].fields["answer"], "42");
    /// ```
    pub fn record<T>(f: impl FnOnce() -> T) -> (T, RecordingLayer) {
        let layer = RecordingLayer::default();
        let subscriber = Registry::default().with(layer.clone());
        let value = tracing::subscriber::with_default(subscriber, f);
        (value, layer)
    }

    /// A closed span and the fields recorded against it.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SpanRecord {
        /// Span name from the callsite metadata.
        pub name: String,
        /// Fields recorded at creation or later via `Span::record`.
        pub fields: HashMap<String, String>,
    }

    /// An emitted event.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct EventRecord {
        /// Event level.
        pub level: Level,
        /// Event target, usually the emitting module path.
        pub target: String,
        /// Name of the innermost span the event was emitted in, if any.
        pub span: Option<String>,
        /// Structured fields, including `message`.
        pub fields: HashMap<String, String>,
    }

    impl EventRecord {
        /// The event's message, if it has one.
        #[must_use]
        pub fn message(&self) -> Option<&str> {
            self.fields.get("message").map(String::as_str)
        }
    }

    impl<S> Layer<S> for RecordingLayer
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(id) else {
                return;
            };
            let mut fields = HashMap::new();
            attrs.record(&mut FieldRecorder(&mut fields));
            span.extensions_mut().insert(SpanRecord {
                name: attrs.metadata().name().to_owned(),
                fields,
            });
        }

        fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(id) else {
                return;
            };
            if let Some(record) = span.extensions_mut().get_mut::<SpanRecord>() {
                values.record(&mut FieldRecorder(&mut record.fields));
            }
        }

        fn on_close(&self, id: Id, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(&id) else {
                return;
            };
            if let Some(record) = span.extensions_mut().remove::<SpanRecord>() {
                self.log().spans.push(record);
            }
        }

        fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
            let mut fields = HashMap::new();
            event.record(&mut FieldRecorder(&mut fields));
            let span = ctx.event_span(event).map(|span| span.name().to_owned());
            self.log().events.push(EventRecord {
                level: *event.metadata().level(),
                target: event.metadata().target().to_owned(),
                span,
                fields,
            });
        }
    }

    struct FieldRecorder<'a>(&'a mut HashMap<String, String>);

    impl FieldRecorder<'_> {
        fn insert(&mut self, field: &Field, value: String) {
            self.0.insert(field.name().to_owned(), value);
        }
    }

    impl Visit for FieldRecorder<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.insert(field, format!("{value:?}"));
        }

        fn record_str(&mut self, field: &Field, value: &str) {
            self.insert(field, value.to_owned());
        }

        fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
            self.insert(field, value.to_string());
        }

        fn record_bool(&mut self, field: &Field, value: bool) {
            self.insert(field, value.to_string());
        }

        fn record_i64(&mut self, field: &Field, value: i64) {
            self.insert(field, value.to_string());
        }

        fn record_u64(&mut self, field: &Field, value: u64) {
            self.insert(field, value.to_string());
        }

        fn record_f64(&mut self, field: &Field, value: f64) {
            self.insert(field, value.to_string());
        }
    }
}

pub mod params {
    //! Builders for the twelve-line parameter files read by the sweep.

    /// Field values for a parameter file. Reserved lines are always written
    /// as `0`.
    #[derive(Debug, Clone, PartialEq)]
    pub struct ParameterFile {
        /// Line 1.
        pub gamma: String,
        /// Line 2.
        pub c: String,
        /// Line 3.
        pub mu: String,
        /// Line 4.
        pub start: String,
        /// Line 5.
        pub max: String,
        /// Line 6.
        pub increment: String,
        /// Line 9.
        pub topology: String,
        /// Line 12.
        pub output: String,
    }

    impl Default for ParameterFile {
        fn default() -> Self {
            Self {
                gamma: "1.1".into(),
                c: "10".into(),
                mu: "1".into(),
                start: "2".into(),
                max: "6".into(),
                increment: "2".into(),
                topology: "1".into(),
                output: "dataout.csv".into(),
            }
        }
    }

    impl ParameterFile {
        /// Sets the sweep bounds.
        #[must_use]
        pub fn sweep(mut self, start: i64, max: i64, increment: i64) -> Self {
            self.start = start.to_string();
            self.max = max.to_string();
            self.increment = increment.to_string();
            self
        }

        /// Sets the topology code.
        #[must_use]
        pub fn topology(mut self, code: i64) -> Self {
            self.topology = code.to_string();
            self
        }

        /// Sets the output base name.
        #[must_use]
        pub fn output(mut self, name: &str) -> Self {
            self.output = name.to_owned();
            self
        }

        /// Renders the file contents.
        ///
        /// # Examples
        /// ```
        /// use sisstat_test_support::params::ParameterFile;
        ///
        /// let text = ParameterFile::default().topology(2).render();
        /// assert_eq!(text.lines().count(), 12);
        /// assert_eq!(text.lines().nth(8), Some("2"));
        /// ```
        #[must_use]
        pub fn render(&self) -> String {
            [
                self.gamma.as_str(),
                self.c.as_str(),
                self.mu.as_str(),
                self.start.as_str(),
                self.max.as_str(),
                self.increment.as_str(),
                "0",
                "0",
                self.topology.as_str(),
                "0",
                "0",
                self.output.as_str(),
            ]
            .iter()
            .map(|line| format!("{line}\n"))
            .collect()
        }
    }
}
