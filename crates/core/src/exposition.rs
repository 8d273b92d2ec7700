//! Prometheus text exposition format (version 0.0.4).

use std::fmt;

/// Content type served alongside a rendered document.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Type of a Prometheus metric family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Gauge => write!(f, "gauge"),
            MetricKind::Counter => write!(f, "counter"),
        }
    }
}

/// Number of fraction digits used for every sample of a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// Whole numbers, e.g. byte counts and counters.
    Integer,
    /// Fixed-point with the given number of decimals.
    Fixed(u8),
}

impl Precision {
    /// Format `value` for a sample line.
    pub fn format(self, value: f64) -> String {
        if value.is_nan() {
            return "NaN".to_string();
        }
        if value.is_infinite() {
            return if value.is_sign_positive() { "+Inf" } else { "-Inf" }.to_string();
        }
        match self {
            Precision::Integer => format!("{:.0}", value),
            Precision::Fixed(digits) => format!("{:.*}", usize::from(digits), value),
        }
    }
}

/// A single labeled observation within a family.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub labels: Vec<(String, String)>,
    pub value: f64,
}

impl Sample {
    pub fn new(value: f64) -> Self {
        Self {
            labels: Vec::new(),
            value,
        }
    }

    /// Append a label. Labels render in the order they are added.
    pub fn label(mut self, name: &str, value: impl Into<String>) -> Self {
        debug_assert!(
            self.labels.iter().all(|(existing, _)| existing != name),
            "duplicate label {name}"
        );
        self.labels.push((name.to_string(), value.into()));
        self
    }
}

/// A metric family: one HELP/TYPE header and its samples.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub precision: Precision,
    pub samples: Vec<Sample>,
}

impl MetricFamily {
    pub fn new(name: &str, help: &str, kind: MetricKind, precision: Precision) -> Self {
        debug_assert!(is_valid_metric_name(name), "invalid metric name {name}");
        Self {
            name: name.to_string(),
            help: help.to_string(),
            kind,
            precision,
            samples: Vec::new(),
        }
    }

    pub fn gauge(name: &str, help: &str, precision: Precision) -> Self {
        Self::new(name, help, MetricKind::Gauge, precision)
    }

    pub fn counter(name: &str, help: &str) -> Self {
        Self::new(name, help, MetricKind::Counter, Precision::Integer)
    }

    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn with_sample(mut self, sample: Sample) -> Self {
        self.samples.push(sample);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn write_to(&self, out: &mut String) {
        out.push_str(&format!("# HELP {} {}\n", self.name, escape_help(&self.help)));
        out.push_str(&format!("# TYPE {} {}\n", self.name, self.kind));
        for sample in &self.samples {
            out.push_str(&render_sample(
                &self.name,
                &sample.labels,
                sample.value,
                self.precision,
            ));
            out.push('\n');
        }
    }
}

/// Ordered set of families produced by one collection cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpositionDocument {
    families: Vec<MetricFamily>,
}

impl ExpositionDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a family. A family whose name is already present has its samples
    /// appended to the existing one so the header stays unique.
    pub fn push(&mut self, family: MetricFamily) {
        match self.families.iter_mut().find(|f| f.name == family.name) {
            Some(existing) => existing.samples.extend(family.samples),
            None => self.families.push(family),
        }
    }

    pub fn extend(&mut self, families: impl IntoIterator<Item = MetricFamily>) {
        for family in families {
            self.push(family);
        }
    }

    pub fn families(&self) -> &[MetricFamily] {
        &self.families
    }

    pub fn family(&self, name: &str) -> Option<&MetricFamily> {
        self.families.iter().find(|f| f.name == name)
    }

    pub fn sample_count(&self) -> usize {
        self.families.iter().map(|f| f.samples.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Render the document. Every line, including the last, ends in `\n`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for family in &self.families {
            family.write_to(&mut out);
        }
        out
    }
}

impl fmt::Display for ExpositionDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Render one sample line: `name{k1="v1",k2="v2"} value`.
pub fn render_sample(
    name: &str,
    labels: &[(String, String)],
    value: f64,
    precision: Precision,
) -> String {
    let mut line = String::with_capacity(name.len() + 16 * (labels.len() + 1));
    line.push_str(name);
    if !labels.is_empty() {
        line.push('{');
        for (i, (key, value)) in labels.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            line.push_str(&format!("{}=\"{}\"", key, escape_label_value(value)));
        }
        line.push('}');
    }
    line.push(' ');
    line.push_str(&precision.format(value));
    line
}

/// Escape a label value: backslash, double-quote, and newline.
pub fn escape_label_value(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape HELP text: backslash and newline.
pub fn escape_help(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Whether `name` matches `[a-zA-Z_:][a-zA-Z0-9_:]*`.
pub fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}
