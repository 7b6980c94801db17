use std::fmt;

/// A single scalar token.
///
/// Floats format through Rust's shortest round-trip `Display`, so encoding the
/// same value always yields the same bytes and parsing them back reproduces
/// the value exactly.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Real(f64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Real(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
        }
    }
}

/// One command argument: a scalar or an ordered sequence of scalars.
///
/// The variant is chosen explicitly by the call site; the encoder never probes
/// argument shapes at runtime. Sequences carry no length prefix at this layer
/// — commands whose receiver needs element counts place them among their
/// scalar arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Scalar(Value),
    Sequence(Vec<Value>),
}

impl Arg {
    pub fn int(v: i64) -> Self {
        Arg::Scalar(Value::Int(v))
    }

    pub fn real(v: f64) -> Self {
        Arg::Scalar(Value::Real(v))
    }

    pub fn text(v: impl Into<String>) -> Self {
        Arg::Scalar(Value::Text(v.into()))
    }

    /// Boolean flags travel as the literal integers 0/1.
    pub fn flag(v: bool) -> Self {
        Arg::Scalar(Value::Int(i64::from(v)))
    }

    pub fn vec3(v: [f64; 3]) -> Self {
        Arg::Sequence(v.iter().map(|&x| Value::Real(x)).collect())
    }

    pub fn pair(v: (f64, f64)) -> Self {
        Arg::Sequence(vec![Value::Real(v.0), Value::Real(v.1)])
    }

    pub fn reals(v: impl IntoIterator<Item = f64>) -> Self {
        Arg::Sequence(v.into_iter().map(Value::Real).collect())
    }
}

/// An immutable named command: a name token plus ordered arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    name: &'static str,
    args: Vec<Arg>,
}

impl Command {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: Arg) -> Self {
        self.args.push(arg);
        self
    }

    pub fn name(&self) -> &str {
        self.name
    }

    /// Append the canonical encoding of this command to `out`.
    ///
    /// One newline-terminated line per token: the name, then each scalar, then
    /// each sequence element in order. String tokens are assumed pre-sanitized
    /// (no embedded newlines); the scene layer enforces that before commands
    /// are built.
    pub fn encode_into(&self, out: &mut String) {
        out.push_str(self.name);
        out.push('\n');
        for arg in &self.args {
            match arg {
                Arg::Scalar(value) => {
                    out.push_str(&value.to_string());
                    out.push('\n');
                }
                Arg::Sequence(values) => {
                    for value in values {
                        out.push_str(&value.to_string());
                        out.push('\n');
                    }
                }
            }
        }
    }
}

/// Append-only accumulator for the encoded command stream.
///
/// Commands are encoded as they are appended and the stream is consumed
/// exactly once by the transport.
#[derive(Debug, Default)]
pub struct CommandBuffer {
    encoded: String,
    count: usize,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, command: Command) {
        command.encode_into(&mut self.encoded);
        self.count += 1;
    }

    /// Number of commands appended so far.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The accumulated stream as text, for diagnostics.
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.encoded.into_bytes()
    }
}
