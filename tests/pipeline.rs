//! Integration tests for the collection pipeline.

mod pipeline {
    mod test_analyzer_cleanup;
    mod test_batch;
    mod test_stats_roundtrip;
}
