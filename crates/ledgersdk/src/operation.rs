//! # Operation Descriptors
//!
//! Every native function a facade exposes is described once, as data: its
//! native name and the kinds of its parameters. Validation runs locally and
//! synchronously against the descriptor before anything is dispatched, so a
//! blank argument or a stale handle never reaches the native layer.
//!
//! ## Rules
//!
//! - `Text` and `Json` must be non-blank strings. JSON option objects are
//!   opaque here; only the native layer parses them.
//! - `OptText` may be absent, but a present value must be non-blank.
//! - `Handle` must carry the declared kind and be live in the registry.
//!   A wrong kind is a bad parameter; a released handle is `InvalidState`.

use ledgercore::Error;
use ledgercore::HandleKind;
use ledgercore::HandleRegistry;
use ledgercore::NativeArg;
use ledgercore::Result;

/// One declared parameter of a native function, with its name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Param {
    Text(&'static str),
    Json(&'static str),
    OptText(&'static str),
    Handle(&'static str, HandleKind),
    Int(&'static str),
    Flag(&'static str),
    Bytes(&'static str),
}

impl Param {
    pub fn name(&self) -> &'static str {
        match *self {
            Param::Text(name)
            | Param::Json(name)
            | Param::OptText(name)
            | Param::Handle(name, _)
            | Param::Int(name)
            | Param::Flag(name)
            | Param::Bytes(name) => name,
        }
    }
}

/// A native function as the facades see it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Operation {
    pub name: &'static str,
    pub params: &'static [Param],
}

impl Operation {
    pub const fn new(name: &'static str, params: &'static [Param]) -> Self {
        Self { name, params }
    }

    /// Checks `args` against the declared parameters, in order.
    ///
    /// The first failure wins. A bad argument at 0-based position `i` is
    /// reported as parameter `i + 1`.
    pub fn validate(&self, args: &[NativeArg], handles: &HandleRegistry) -> Result<()> {
        if args.len() != self.params.len() {
            return Err(Error::invalid_structure(format!(
                "{} takes {} arguments, got {}",
                self.name,
                self.params.len(),
                args.len()
            )));
        }

        for (i, (param, arg)) in self.params.iter().zip(args).enumerate() {
            let index = i as u32 + 1;
            let bad = |what: &str| Error::invalid_param(index, format!("{}: `{}` {}", self.name, param.name(), what));

            match (*param, arg) {
                (Param::Text(_), NativeArg::Str(s)) | (Param::Json(_), NativeArg::Str(s)) => {
                    if s.trim().is_empty() {
                        return Err(bad("must not be blank"));
                    }
                }
                (Param::OptText(_), NativeArg::OptStr(None)) => {}
                (Param::OptText(_), NativeArg::OptStr(Some(s))) | (Param::OptText(_), NativeArg::Str(s)) => {
                    if s.trim().is_empty() {
                        return Err(bad("must be absent or non-blank"));
                    }
                }
                (Param::Handle(_, kind), NativeArg::Handle(handle)) => {
                    if handle.kind != kind {
                        return Err(bad(&format!("expects a {} handle, got {}", kind, handle)));
                    }
                    handles.check_live(handle)?;
                }
                (Param::Int(_), NativeArg::Int(_)) => {}
                (Param::Flag(_), NativeArg::Bool(_)) => {}
                (Param::Bytes(_), NativeArg::Bytes(b)) => {
                    if b.is_empty() {
                        return Err(bad("must not be empty"));
                    }
                }
                (_, other) => {
                    return Err(bad(&format!("has the wrong type: {:?}", other)));
                }
            }
        }

        Ok(())
    }
}
