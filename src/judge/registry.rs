use crate::config::types::{GradeError, Result};
use crate::judge::adapter::InterpreterAdapter;
use crate::judge::languages::python::PythonAdapter;

pub fn adapter_for(language: &str) -> Result<Box<dyn InterpreterAdapter>> {
    match language {
        "python" | "py" | "python3" => Ok(Box::new(PythonAdapter)),
        _ => Err(GradeError::Config(format!(
            "unsupported language adapter: {language}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_aliases() {
        for name in ["python", "py", "python3"] {
            assert_eq!(adapter_for(name).unwrap().language(), "python");
        }
    }

    #[test]
    fn test_unknown_language() {
        let err = adapter_for("cobol").err().unwrap();
        assert!(matches!(err, GradeError::Config(_)));
    }
}
