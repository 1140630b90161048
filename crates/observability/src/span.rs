use tracing::Span;

use streamkeep_core::CausalContext;

/// An `info` span tagged with the flow's correlation and causation ids.
///
/// Reading the ids materializes the correlation id, so every record inside
/// the span reports the id the flow will keep.
pub fn causal_span(context: &CausalContext) -> Span {
    tracing::info_span!(
        "causal_flow",
        correlation_id = %context.correlation_id(),
        causation_id = %context.causation_id(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn building_the_span_pins_the_correlation_id() {
        let context = CausalContext::new();
        assert!(!context.is_correlation_set());

        let _span = causal_span(&context);

        assert!(context.is_correlation_set());
        assert!(!context.is_causation_set());
    }
}
