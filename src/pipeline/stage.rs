/// Where a request is in the pipeline.
///
/// Happy path: `Idle → GeneratingQuery → Validating → Executing → Explaining → Done`.
/// `Rejected` and `Failed` are terminal and reachable from any working stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    GeneratingQuery,
    Validating,
    Executing,
    Explaining,
    Done,
    Rejected,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Idle => "idle",
            PipelineStage::GeneratingQuery => "generating_query",
            PipelineStage::Validating => "validating",
            PipelineStage::Executing => "executing",
            PipelineStage::Explaining => "explaining",
            PipelineStage::Done => "done",
            PipelineStage::Rejected => "rejected",
            PipelineStage::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineStage::Done | PipelineStage::Rejected | PipelineStage::Failed
        )
    }

    /// The stage that follows on success, `None` once terminal.
    pub fn next(&self) -> Option<PipelineStage> {
        match self {
            PipelineStage::Idle => Some(PipelineStage::GeneratingQuery),
            PipelineStage::GeneratingQuery => Some(PipelineStage::Validating),
            PipelineStage::Validating => Some(PipelineStage::Executing),
            PipelineStage::Executing => Some(PipelineStage::Explaining),
            PipelineStage::Explaining => Some(PipelineStage::Done),
            PipelineStage::Done | PipelineStage::Rejected | PipelineStage::Failed => None,
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_order() {
        let mut stage = PipelineStage::Idle;
        let mut seen = vec![stage];
        while let Some(next) = stage.next() {
            stage = next;
            seen.push(stage);
        }
        assert_eq!(
            seen,
            vec![
                PipelineStage::Idle,
                PipelineStage::GeneratingQuery,
                PipelineStage::Validating,
                PipelineStage::Executing,
                PipelineStage::Explaining,
                PipelineStage::Done,
            ]
        );
    }

    #[test]
    fn test_terminal_stages_have_no_successor() {
        for stage in [PipelineStage::Done, PipelineStage::Rejected, PipelineStage::Failed] {
            assert!(stage.is_terminal());
            assert_eq!(stage.next(), None);
        }
        assert!(!PipelineStage::Executing.is_terminal());
    }
}
