use mbasic_core::errors::{BasicError, BasicResult};
use mbasic_core::value::Value;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Evaluates a built-in function call. `GET` is handled by the interpreter
/// directly rather than here, since it needs access to the console's
/// [`mbasic_core::io::LineIo`] and the interpreter's keyboard buffer, not
/// just its arguments.
pub fn call_builtin(name: &str, args: &[Value], rng: &mut StdRng, line: usize) -> BasicResult<Value> {
    match name {
        "ABS" => Ok(Value::Number(arg1(args, name, line)?.as_number().abs())),
        "ATN" => Ok(Value::Number(arg1(args, name, line)?.as_number().atan())),
        "COS" => Ok(Value::Number(arg1(args, name, line)?.as_number().cos())),
        "SIN" => Ok(Value::Number(arg1(args, name, line)?.as_number().sin())),
        "TAN" => Ok(Value::Number(arg1(args, name, line)?.as_number().tan())),
        "EXP" => Ok(Value::Number(arg1(args, name, line)?.as_number().exp())),
        "LOG" => {
            let n = arg1(args, name, line)?.as_number();
            if n <= 0.0 {
                return Err(BasicError::runtime("Illegal function call", line));
            }
            Ok(Value::Number(n.ln()))
        }
        "SQR" => {
            let n = arg1(args, name, line)?.as_number();
            if n < 0.0 {
                return Err(BasicError::runtime("Illegal function call", line));
            }
            Ok(Value::Number(n.sqrt()))
        }
        "INT" => Ok(Value::Number(arg1(args, name, line)?.as_number().floor())),
        "SGN" => {
            let n = arg1(args, name, line)?.as_number();
            Ok(Value::Number(if n > 0.0 { 1.0 } else if n < 0.0 { -1.0 } else { 0.0 }))
        }
        "RND" => {
            if let Some(x) = args.first() {
                if x.as_number() < 0.0 {
                    *rng = StdRng::seed_from_u64(x.as_int32().unsigned_abs() as u64);
                }
            }
            Ok(Value::Number(rng.gen_range(0.0..1.0)))
        }
        "LEN" => Ok(Value::Number(arg1(args, name, line)?.as_string().chars().count() as f64)),
        "VAL" => Ok(Value::Number(arg1(args, name, line)?.as_number())),
        "STR$" => {
            let n = arg1(args, name, line)?.as_number();
            let text = arg1(args, name, line)?.as_string();
            Ok(Value::Text(if n >= 0.0 { format!(" {text}") } else { text }))
        }
        "CHR$" => {
            let code = arg1(args, name, line)?.as_int32();
            let ch = u8::try_from(code)
                .map_err(|_| BasicError::runtime("Illegal function call", line))?;
            Ok(Value::Text((ch as char).to_string()))
        }
        "ASC" => {
            let text = arg1(args, name, line)?.as_string();
            let ch = text
                .chars()
                .next()
                .ok_or_else(|| BasicError::runtime("Illegal function call", line))?;
            Ok(Value::Number(ch as u32 as f64))
        }
        "LEFT$" => {
            let (text, count) = arg2(args, name, line)?;
            let text = text.as_string();
            let count = (count.as_number().max(0.0)) as usize;
            Ok(Value::Text(text.chars().take(count).collect()))
        }
        "RIGHT$" => {
            let (text, count) = arg2(args, name, line)?;
            let text = text.as_string();
            let count = (count.as_number().max(0.0)) as usize;
            let total = text.chars().count();
            let skip = total.saturating_sub(count);
            Ok(Value::Text(text.chars().skip(skip).collect()))
        }
        "MID$" => {
            if args.len() < 2 || args.len() > 3 {
                return Err(BasicError::runtime("Wrong number of arguments to MID$", line));
            }
            let text = args[0].as_string();
            let start = (args[1].as_number().max(1.0)) as usize - 1;
            let chars: Vec<char> = text.chars().collect();
            if start >= chars.len() {
                return Ok(Value::Text(String::new()));
            }
            let count = if args.len() == 3 {
                (args[2].as_number().max(0.0)) as usize
            } else {
                chars.len() - start
            };
            let end = (start + count).min(chars.len());
            Ok(Value::Text(chars[start..end].iter().collect()))
        }
        "TAB" | "SPC" => {
            let count = arg1(args, name, line)?.as_number().max(0.0) as usize;
            Ok(Value::Text(" ".repeat(count)))
        }
        _ => Err(BasicError::runtime(format!("Unknown function {name}"), line)),
    }
}

fn arg1<'a>(args: &'a [Value], name: &str, line: usize) -> BasicResult<&'a Value> {
    args.first()
        .ok_or_else(|| BasicError::runtime(format!("Wrong number of arguments to {name}"), line))
}

fn arg2(args: &[Value], name: &str, line: usize) -> BasicResult<(Value, Value)> {
    if args.len() != 2 {
        return Err(BasicError::runtime(format!("Wrong number of arguments to {name}"), line));
    }
    Ok((args[0].clone(), args[1].clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1)
    }

    #[test]
    fn abs_and_sgn_match_classic_semantics() {
        let mut r = rng();
        assert_eq!(call_builtin("ABS", &[Value::Number(-5.0)], &mut r, 0).unwrap(), Value::Number(5.0));
        assert_eq!(call_builtin("SGN", &[Value::Number(-5.0)], &mut r, 0).unwrap(), Value::Number(-1.0));
        assert_eq!(call_builtin("SGN", &[Value::Number(0.0)], &mut r, 0).unwrap(), Value::Number(0.0));
    }

    #[test]
    fn sqr_of_a_negative_number_is_illegal() {
        let mut r = rng();
        assert!(call_builtin("SQR", &[Value::Number(-1.0)], &mut r, 0).is_err());
    }

    #[test]
    fn left_right_mid_slice_by_character() {
        let mut r = rng();
        let text = Value::Text("HELLO".into());
        assert_eq!(call_builtin("LEFT$", &[text.clone(), Value::Number(2.0)], &mut r, 0).unwrap(), Value::Text("HE".into()));
        assert_eq!(call_builtin("RIGHT$", &[text.clone(), Value::Number(2.0)], &mut r, 0).unwrap(), Value::Text("LO".into()));
        assert_eq!(call_builtin("MID$", &[text, Value::Number(2.0), Value::Number(3.0)], &mut r, 0).unwrap(), Value::Text("ELL".into()));
    }

    #[test]
    fn chr_and_asc_round_trip() {
        let mut r = rng();
        let ch = call_builtin("CHR$", &[Value::Number(65.0)], &mut r, 0).unwrap();
        assert_eq!(ch, Value::Text("A".into()));
        assert_eq!(call_builtin("ASC", &[ch], &mut r, 0).unwrap(), Value::Number(65.0));
    }

    #[test]
    fn tab_and_spc_emit_spaces() {
        let mut r = rng();
        assert_eq!(call_builtin("TAB", &[Value::Number(3.0)], &mut r, 0).unwrap(), Value::Text("   ".into()));
    }

    #[test]
    fn str_dollar_leads_non_negative_numbers_with_a_space() {
        let mut r = rng();
        assert_eq!(call_builtin("STR$", &[Value::Number(5.0)], &mut r, 0).unwrap(), Value::Text(" 5".into()));
        assert_eq!(call_builtin("STR$", &[Value::Number(-5.0)], &mut r, 0).unwrap(), Value::Text("-5".into()));
    }

    #[test]
    fn negative_rnd_argument_reseeds_before_drawing() {
        let mut r1 = rng();
        let mut r2 = StdRng::seed_from_u64(999);
        let a = call_builtin("RND", &[Value::Number(-5.0)], &mut r1, 0).unwrap();
        let b = call_builtin("RND", &[Value::Number(-5.0)], &mut r2, 0).unwrap();
        assert_eq!(a, b);
    }
}
