/// The stages a multipart decode moves through, in stream order.
///
/// `FindingFirstBoundary` is the initial stage; `DrainingEpilogue` is
/// terminal. A part is open between `ReadingBoundary` and the next
/// `ReadingBoundary` or `ReadingCloser`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StreamingStage {
    FindingFirstBoundary,
    ReadingBoundary,
    ReadingTransportPadding,
    ReadingFieldHeaders,
    ReadingFieldData,
    ReadingCloser,
    DrainingEpilogue,
}
