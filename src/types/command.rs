/// Whether executing a command returns rows or a success signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Read,
    Write,
}

/// A built, backend-native statement batch ready for execution.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    kind: CommandKind,
    statements: Vec<String>,
}

impl Command {
    pub fn read(statement: String) -> Self {
        Self {
            kind: CommandKind::Read,
            statements: vec![statement],
        }
    }

    pub fn write(statements: Vec<String>) -> Self {
        Self {
            kind: CommandKind::Write,
            statements,
        }
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn is_read(&self) -> bool {
        self.kind == CommandKind::Read
    }

    /// Individual statements, in execution order.
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// The batch as one string, statements separated by `"; "`.
    /// This is the dry-run text and what single-call drivers execute.
    pub fn text(&self) -> String {
        self.statements.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_joins_batch() {
        let cmd = Command::write(vec![
            "INSERT INTO t(a) VALUES (1)".to_string(),
            "INSERT INTO t(a) VALUES (2)".to_string(),
        ]);
        assert_eq!(
            cmd.text(),
            "INSERT INTO t(a) VALUES (1); INSERT INTO t(a) VALUES (2)"
        );
        assert_eq!(cmd.kind(), CommandKind::Write);
    }

    #[test]
    fn test_read_has_single_statement() {
        let cmd = Command::read("SELECT * FROM t".to_string());
        assert!(cmd.is_read());
        assert_eq!(cmd.statements().len(), 1);
        assert_eq!(cmd.text(), "SELECT * FROM t");
    }
}
