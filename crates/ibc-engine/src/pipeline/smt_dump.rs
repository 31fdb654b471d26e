use std::path::Path;

use ibc_smt::backends::smtlib_printer::{sort_to_smtlib, to_smtlib};
use ibc_smt::backends::smtlib_process::LOGIC;
use tracing::info;

use crate::encoder::IbcEncoding;

/// Standalone SMT-LIB2 script for `encoding`, ending in `get-value` for
/// every model variable.
pub fn encoding_to_smt2_script(encoding: &IbcEncoding) -> String {
    let mut smt = String::new();
    smt.push_str(&format!(
        "; inductive barrier certificate chain, k = {}\n",
        encoding.chain_len.saturating_sub(1)
    ));
    smt.push_str("(set-option :produce-models true)\n");
    smt.push_str(&format!("(set-logic {LOGIC})\n"));
    for (name, sort) in &encoding.declarations {
        smt.push_str(&format!(
            "(declare-const {} {})\n",
            name,
            sort_to_smtlib(sort)
        ));
    }
    smt.push_str(&format!("(assert {})\n", to_smtlib(&encoding.assertion)));
    smt.push_str("(check-sat)\n");
    if !encoding.model_vars.is_empty() {
        let names: Vec<&str> = encoding.model_vars.iter().map(|(n, _)| n.as_str()).collect();
        smt.push_str(&format!("(get-value ({}))\n", names.join(" ")));
    }
    smt.push_str("(exit)\n");
    smt
}

pub fn dump_smt_to_file(encoding: &IbcEncoding, path: &Path) -> std::io::Result<()> {
    std::fs::write(path, encoding_to_smt2_script(encoding))?;
    info!("SMT dump written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{encode_fixed, encode_synthesis};
    use crate::systems;

    #[test]
    fn script_has_declarations_assertion_and_footer() {
        let problem = systems::linear_1d().expect("built-in");
        let (encoding, _) = encode_synthesis(&problem, 1);
        let script = encoding_to_smt2_script(&encoding);
        assert!(script.contains("(set-logic NRA)"));
        assert!(script.contains("(declare-const c_k01_b000_m000 Real)"));
        assert!(script.contains("(declare-const c_k01_b001_m001 Real)"));
        assert_eq!(script.matches("(assert ").count(), 1);
        assert!(script.contains("(check-sat)"));
        assert!(script.contains(
            "(get-value (c_k01_b000_m000 c_k01_b000_m001 c_k01_b001_m000 c_k01_b001_m001))"
        ));
        assert!(script.ends_with("(exit)\n"));
    }

    #[test]
    fn fixed_chain_script_has_no_get_value() {
        let problem = systems::linear_1d().expect("built-in");
        let encoding = encode_fixed(&problem, &systems::linear_1d_chain());
        let script = encoding_to_smt2_script(&encoding);
        assert!(!script.contains("declare-const"));
        assert!(!script.contains("get-value"));
    }

    #[test]
    fn dump_writes_the_script() {
        let problem = systems::linear_1d().expect("built-in");
        let (encoding, _) = encode_synthesis(&problem, 0);
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("k0.smt2");
        dump_smt_to_file(&encoding, &path).expect("write");
        let written = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(written, encoding_to_smt2_script(&encoding));
    }
}
