//! # Decoder Properties
//!
//! Property-based checks of the streaming decoder:
//!
//! - Output doesn't depend on how the stream is chunked
//! - Output matches a simple model of the state machine
//! - Arbitrary bytes never panic and always leave `feed` in finite time

use proptest::prelude::*;
use tivu::pcl::token::ESC;
use tivu::pcl::{Decoder, Image, State};

// =============================================================================
// Stream Model
// =============================================================================

#[derive(Debug, Clone)]
enum Segment {
    /// Bytes that are not part of any token
    Noise(Vec<u8>),
    Start,
    End,
    /// Raster-data command followed by exactly its bytes
    Row(Vec<u8>),
    Resolution(u16),
    /// A token the decoder matches but ignores
    Unhandled,
}

impl Segment {
    fn encode(&self, out: &mut Vec<u8>) {
        match self {
            Segment::Noise(bytes) => out.extend_from_slice(bytes),
            Segment::Start => out.extend_from_slice(b"\x1b*rA"),
            Segment::End => out.extend_from_slice(b"\x1b*rB"),
            Segment::Row(data) => {
                out.extend(format!("\x1b*b{}W", data.len()).into_bytes());
                out.extend_from_slice(data);
            }
            Segment::Resolution(dpi) => out.extend(format!("\x1b*t{}R", dpi).into_bytes()),
            Segment::Unhandled => out.extend_from_slice(b"\x1b&k2W"),
        }
    }
}

fn encode(segments: &[Segment]) -> Vec<u8> {
    let mut out = Vec::new();
    for segment in segments {
        segment.encode(&mut out);
    }
    out
}

/// Expected rows and final state for a well-formed stream.
fn model(segments: &[Segment]) -> (Vec<Vec<u8>>, State) {
    let mut rows = Vec::new();
    let mut state = State::Idle;
    for segment in segments {
        match segment {
            Segment::Start => state = State::Graphics,
            Segment::End => state = State::Idle,
            Segment::Row(data) if state == State::Graphics => rows.push(data.clone()),
            _ => {}
        }
    }
    (rows, state)
}

fn decode_chunks<'a>(chunks: impl IntoIterator<Item = &'a [u8]>) -> (Image, State) {
    let mut decoder = Decoder::new();
    for chunk in chunks {
        decoder.feed(chunk);
    }
    (decoder.image().clone(), decoder.state())
}

// =============================================================================
// Arbitrary Generators
// =============================================================================

fn payload_byte() -> impl Strategy<Value = u8> {
    any::<u8>().prop_filter("ESC would start a token", |b| *b != ESC)
}

fn arb_segment() -> impl Strategy<Value = Segment> {
    prop_oneof![
        prop::collection::vec(payload_byte(), 0..16).prop_map(Segment::Noise),
        Just(Segment::Start),
        Just(Segment::End),
        prop::collection::vec(payload_byte(), 0..12).prop_map(Segment::Row),
        prop::collection::vec(payload_byte(), 0..12).prop_map(Segment::Row),
        any::<u16>().prop_map(Segment::Resolution),
        Just(Segment::Unhandled),
    ]
}

fn arb_stream() -> impl Strategy<Value = Vec<Segment>> {
    prop::collection::vec(arb_segment(), 0..40)
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn single_feed_matches_model(segments in arb_stream()) {
        let bytes = encode(&segments);
        let (image, state) = decode_chunks([bytes.as_slice()]);
        let (rows, expected_state) = model(&segments);
        prop_assert_eq!(image.rows(), rows.as_slice());
        prop_assert_eq!(state, expected_state);
    }

    #[test]
    fn two_way_split_matches_single_feed(
        segments in arb_stream(),
        split in any::<prop::sample::Index>(),
    ) {
        let bytes = encode(&segments);
        let at = split.index(bytes.len() + 1);
        let (head, tail) = bytes.split_at(at);

        let whole = decode_chunks([bytes.as_slice()]);
        let split = decode_chunks([head, tail]);
        prop_assert_eq!(whole, split);
    }

    #[test]
    fn byte_at_a_time_matches_single_feed(segments in arb_stream()) {
        let bytes = encode(&segments);
        let whole = decode_chunks([bytes.as_slice()]);
        let single = decode_chunks(bytes.chunks(1));
        prop_assert_eq!(whole, single);
    }

    #[test]
    fn random_chunk_sizes_match_single_feed(
        segments in arb_stream(),
        sizes in prop::collection::vec(1usize..32, 1..64),
    ) {
        let bytes = encode(&segments);
        let mut chunks = Vec::new();
        let mut rest = bytes.as_slice();
        for size in sizes.iter().cycle() {
            if rest.is_empty() {
                break;
            }
            let (chunk, tail) = rest.split_at((*size).min(rest.len()));
            chunks.push(chunk);
            rest = tail;
        }

        let whole = decode_chunks([bytes.as_slice()]);
        let chunked = decode_chunks(chunks);
        prop_assert_eq!(whole, chunked);
    }

    #[test]
    fn arbitrary_bytes_never_panic(
        data in prop::collection::vec(any::<u8>(), 0..512),
        chunk in 1usize..64,
    ) {
        let mut decoder = Decoder::new();
        for piece in data.chunks(chunk) {
            decoder.feed(piece);
            prop_assert!(decoder.pending() <= data.len());
        }
        let decoded: usize = decoder.image().rows().iter().map(Vec::len).sum();
        prop_assert!(decoded + decoder.pending() <= data.len());
    }

    #[test]
    fn empty_feed_changes_nothing(segments in arb_stream()) {
        let bytes = encode(&segments);
        let mut decoder = Decoder::new();
        decoder.feed(&bytes);
        let before = (decoder.image().clone(), decoder.state(), decoder.row_length(), decoder.pending());
        decoder.feed(&[]);
        let after = (decoder.image().clone(), decoder.state(), decoder.row_length(), decoder.pending());
        prop_assert_eq!(before, after);
    }
}
