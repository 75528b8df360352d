//! Pretty-printed JSON on standard output.
//!
//! Non-ASCII text (Portuguese job titles, `€`) is written as-is.

use crate::error::Result;
use serde::Serialize;
use std::io::Write;

/// Serialize `value` as indented JSON followed by a newline.
pub fn write_pretty<W: Write, T: Serialize + ?Sized>(mut out: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// [`write_pretty`] to standard output.
pub fn print_pretty<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    write_pretty(std::io::stdout().lock(), value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_pretty_keeps_unicode() {
        let mut buf = Vec::new();
        write_pretty(&mut buf, &json!([{"titulo": "Engenheiro de Dados", "salario": "2000€"}])).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("2000€"));
        assert!(text.contains("\n  {"));
        assert!(text.ends_with("]\n"));
    }
}
