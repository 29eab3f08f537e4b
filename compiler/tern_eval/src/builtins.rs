//! Native implementations of the builtin functions.
//!
//! Signatures come from [`tern_ir::BUILTIN_SIGNATURES`]; this module pairs
//! each one with its native function. The pairing is built once per process
//! and never changes; the interpreter injects it into the root frame.
//!
//! Arguments arrive already coerced for `str` parameters. `num` parameters
//! are checked here.

use std::io::BufRead;
use std::sync::LazyLock;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tern_ir::{BuiltinSig, BUILTIN_SIGNATURES};
use tern_resolve::Prim;

use crate::errors::{builtin_failure, type_mismatch, ControlAction, EvalResult};
use crate::print_handler::PrintHandlerImpl;
use crate::Value;

/// What a builtin may touch besides its arguments.
pub struct BuiltinContext<'a> {
    pub print: &'a PrintHandlerImpl,
}

pub type BuiltinFn = fn(&BuiltinContext<'_>, &[Value]) -> EvalResult<Value>;

/// A builtin: its signature and native function.
pub struct Builtin {
    pub sig: &'static BuiltinSig,
    pub func: BuiltinFn,
}

impl Builtin {
    pub fn name(&self) -> &'static str {
        self.sig.name
    }

    pub fn arity(&self) -> usize {
        self.sig.arity()
    }
}

impl std::fmt::Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Builtin({})", self.sig.name)
    }
}

const IMPLS: &[(&str, BuiltinFn)] = &[
    ("clock", clock),
    ("sleep", sleep),
    ("exit", exit),
    ("shell", shell),
    ("int", int),
    ("hex", hex),
    ("bin", bin),
    ("dec", dec),
    ("print", print),
    ("input", input),
    ("range", range),
    ("ping", ping),
];

static BUILTINS: LazyLock<Box<[Builtin]>> = LazyLock::new(|| {
    BUILTIN_SIGNATURES
        .iter()
        .filter_map(|sig| {
            IMPLS
                .iter()
                .find(|(name, _)| *name == sig.name)
                .map(|&(_, func)| Builtin { sig, func })
        })
        .collect()
});

/// Every builtin with a native implementation, in registration order.
pub fn builtins() -> &'static [Builtin] {
    &BUILTINS
}

fn num_arg(args: &[Value], index: usize) -> EvalResult<f64> {
    match args.get(index) {
        Some(Value::Number(n)) => Ok(*n),
        Some(other) => Err(type_mismatch(Prim::Num, other.prim()).into()),
        None => Err(type_mismatch(Prim::Num, Prim::None).into()),
    }
}

fn str_arg(args: &[Value], index: usize) -> std::rc::Rc<str> {
    args.get(index)
        .map_or_else(|| std::rc::Rc::from(""), Value::to_display_string)
}

/// `n` as an integer, or an error naming the builtin.
fn integral(name: &'static str, n: f64) -> EvalResult<i64> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15 {
        Ok(n as i64)
    } else {
        Err(builtin_failure(name, format!("expected an integral number, found {n}")).into())
    }
}

fn clock(_: &BuiltinContext<'_>, _: &[Value]) -> EvalResult<Value> {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0.0, |d| d.as_secs_f64());
    Ok(Value::Number(secs))
}

fn sleep(_: &BuiltinContext<'_>, args: &[Value]) -> EvalResult<Value> {
    let secs = num_arg(args, 0)?;
    let duration = Duration::try_from_secs_f64(secs)
        .map_err(|_| builtin_failure("sleep", format!("invalid duration {secs}")))?;
    std::thread::sleep(duration);
    Ok(Value::None)
}

fn exit(_: &BuiltinContext<'_>, args: &[Value]) -> EvalResult<Value> {
    let code = num_arg(args, 0)?;
    Err(ControlAction::Exit(code.trunc() as i32))
}

fn shell(_: &BuiltinContext<'_>, args: &[Value]) -> EvalResult<Value> {
    let command = str_arg(args, 0);
    let output = std::process::Command::new("sh")
        .arg("-c")
        .arg(&*command)
        .output()
        .map_err(|e| builtin_failure("shell", e.to_string()))?;
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    Ok(Value::string(text.trim()))
}

fn int(_: &BuiltinContext<'_>, args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Number(num_arg(args, 0)?.trunc()))
}

fn hex(_: &BuiltinContext<'_>, args: &[Value]) -> EvalResult<Value> {
    let n = integral("hex", num_arg(args, 0)?)?;
    let sign = if n < 0 { "-" } else { "" };
    Ok(Value::string(&format!("{sign}0x{:x}", n.unsigned_abs())))
}

fn bin(_: &BuiltinContext<'_>, args: &[Value]) -> EvalResult<Value> {
    let n = integral("bin", num_arg(args, 0)?)?;
    let sign = if n < 0 { "-" } else { "" };
    Ok(Value::string(&format!("{sign}0b{:b}", n.unsigned_abs())))
}

fn dec(_: &BuiltinContext<'_>, args: &[Value]) -> EvalResult<Value> {
    let text = str_arg(args, 0);
    let fail = || builtin_failure("dec", format!("can not convert \"{text}\" to decimal"));
    let (digits, radix) = if let Some(rest) = text.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = text.strip_prefix("0b") {
        (rest, 2)
    } else {
        return Err(fail().into());
    };
    let n = i64::from_str_radix(digits, radix).map_err(|_| fail())?;
    Ok(Value::Number(n as f64))
}

fn print(ctx: &BuiltinContext<'_>, args: &[Value]) -> EvalResult<Value> {
    ctx.print.println(&str_arg(args, 0));
    Ok(Value::None)
}

fn input(ctx: &BuiltinContext<'_>, args: &[Value]) -> EvalResult<Value> {
    ctx.print.print(&str_arg(args, 0));
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| builtin_failure("input", e.to_string()))?;
    let line = line.strip_suffix('\n').unwrap_or(&line);
    let line = line.strip_suffix('\r').unwrap_or(line);
    Ok(Value::string(line))
}

fn range(_: &BuiltinContext<'_>, args: &[Value]) -> EvalResult<Value> {
    let n = num_arg(args, 0)?;
    let len = if n.is_finite() && n > 0.0 { n as usize } else { 0 };
    Ok(Value::array((0..len).map(|i| Value::Number(i as f64)).collect()))
}

fn ping(_: &BuiltinContext<'_>, args: &[Value]) -> EvalResult<Value> {
    let url = str_arg(args, 0);
    let agent = ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(30))
        .build();
    let status = match agent.get(&url).call() {
        Ok(response) => response.status(),
        Err(ureq::Error::Status(code, _)) => code,
        Err(e) => return Err(builtin_failure("ping", e.to_string()).into()),
    };
    Ok(Value::Number(f64::from(status)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EvalErrorKind;
    use crate::print_handler::BufferPrintHandler;
    use pretty_assertions::assert_eq;

    fn call(name: &str, args: &[Value]) -> EvalResult<Value> {
        let handler = PrintHandlerImpl::Silent;
        let ctx = BuiltinContext { print: &handler };
        match builtins().iter().find(|b| b.name() == name) {
            Some(builtin) => (builtin.func)(&ctx, args),
            None => panic!("no builtin named {name}"),
        }
    }

    fn failure(result: EvalResult<Value>) -> Option<EvalErrorKind> {
        match result {
            Err(ControlAction::Error(err)) => Some(err.kind),
            _ => None,
        }
    }

    #[test]
    fn every_signature_has_an_implementation() {
        let names: Vec<_> = builtins().iter().map(Builtin::name).collect();
        let expected: Vec<_> = BUILTIN_SIGNATURES.iter().map(|s| s.name).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn int_truncates_toward_zero() {
        assert_eq!(call("int", &[Value::Number(3.9)]), Ok(Value::Number(3.0)));
        assert_eq!(call("int", &[Value::Number(-3.9)]), Ok(Value::Number(-3.0)));
    }

    #[test]
    fn radix_conversions() {
        assert_eq!(call("hex", &[Value::Number(255.0)]), Ok(Value::string("0xff")));
        assert_eq!(call("hex", &[Value::Number(-16.0)]), Ok(Value::string("-0x10")));
        assert_eq!(call("bin", &[Value::Number(5.0)]), Ok(Value::string("0b101")));
        assert_eq!(call("dec", &[Value::string("0x1f")]), Ok(Value::Number(31.0)));
        assert_eq!(call("dec", &[Value::string("0b11")]), Ok(Value::Number(3.0)));
    }

    #[test]
    fn radix_conversion_failures() {
        assert!(matches!(
            failure(call("hex", &[Value::Number(1.5)])),
            Some(EvalErrorKind::Builtin { name: "hex", .. })
        ));
        assert!(matches!(
            failure(call("dec", &[Value::string("12")])),
            Some(EvalErrorKind::Builtin { name: "dec", .. })
        ));
        assert_eq!(
            failure(call("int", &[Value::string("1")])),
            Some(EvalErrorKind::TypeMismatch {
                expected: Prim::Num,
                found: Prim::Str,
            })
        );
    }

    #[test]
    fn range_builds_an_array() {
        let Ok(Value::Array(array)) = call("range", &[Value::Number(3.0)]) else {
            panic!("range did not return an array");
        };
        assert_eq!(array.len(), 3);
        assert_eq!(array.get(2), Some(Value::Number(2.0)));
        assert_eq!(
            call("range", &[Value::Number(-1.0)]).map(|v| v.to_string()),
            Ok("[]".to_string())
        );
    }

    #[test]
    fn exit_unwinds_with_the_code() {
        assert_eq!(call("exit", &[Value::Number(3.7)]), Err(ControlAction::Exit(3)));
    }

    #[test]
    fn print_writes_a_line() {
        let handler = PrintHandlerImpl::Buffer(BufferPrintHandler::new());
        let ctx = BuiltinContext { print: &handler };
        let print = builtins().iter().find(|b| b.name() == "print");
        let result = print.map(|b| (b.func)(&ctx, &[Value::string("hi")]));
        assert_eq!(result, Some(Ok(Value::None)));
        assert_eq!(handler.get_output(), "hi\n");
    }

    #[cfg(unix)]
    #[test]
    fn shell_captures_both_streams() {
        assert_eq!(
            call("shell", &[Value::string("echo out; echo err 1>&2")]),
            Ok(Value::string("out\nerr"))
        );
    }

    #[test]
    fn clock_is_after_the_epoch() {
        assert!(matches!(call("clock", &[]), Ok(Value::Number(n)) if n > 0.0));
    }
}
