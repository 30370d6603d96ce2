//! Inline decoration payload carried by a run.
//!
//! The edit engine never reasons about decoration; it only has to keep it
//! attached to the right characters while runs are split, merged, retagged or
//! trimmed. Spans are byte ranges into the owning run's text and are kept in
//! canonical form: sorted, non-overlapping, non-empty, with no empty mark sets
//! and no two adjacent spans carrying the same marks. Canonical form makes
//! structural equality meaningful (history dedupe, idempotence checks).

use std::ops::Range;

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Marks: u8 {
        const BOLD          = 0b0000_0001;
        const ITALIC        = 0b0000_0010;
        const UNDERLINE     = 0b0000_0100;
        const STRIKETHROUGH = 0b0000_1000;
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MarkSpan {
    pub range: Range<usize>,
    pub marks: Marks,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Decoration {
    spans: Vec<MarkSpan>,
}

impl Decoration {
    /// Decoration applying `marks` to the whole of `[0, len)`.
    pub fn uniform(len: usize, marks: Marks) -> Self {
        Self::from_segments([(0..len, marks)])
    }

    /// Build from arbitrary (possibly overlapping, unsorted) segments; later segments win.
    pub fn from_segments<I>(segments: I) -> Self
    where
        I: IntoIterator<Item = (Range<usize>, Marks)>,
    {
        let mut out = Decoration::default();
        for (range, marks) in segments {
            out.assign(range, marks);
        }
        out
    }

    pub fn is_plain(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn spans(&self) -> &[MarkSpan] {
        &self.spans
    }

    pub fn marks_at(&self, byte: usize) -> Marks {
        self.spans
            .iter()
            .find(|s| s.range.contains(&byte))
            .map(|s| s.marks)
            .unwrap_or_default()
    }

    /// Partition `[0, len)` into consecutive segments, including unmarked gaps.
    pub fn segments(&self, len: usize) -> Vec<(Range<usize>, Marks)> {
        let mut out = Vec::new();
        let mut cursor = 0;
        for span in &self.spans {
            if span.range.start >= len {
                break;
            }
            if span.range.start > cursor {
                out.push((cursor..span.range.start, Marks::empty()));
            }
            let end = span.range.end.min(len);
            out.push((span.range.start..end, span.marks));
            cursor = end;
        }
        if cursor < len {
            out.push((cursor..len, Marks::empty()));
        }
        out
    }

    /// True when every byte of `range` carries `mark`.
    pub fn covers(&self, range: Range<usize>, mark: Marks) -> bool {
        if range.is_empty() {
            return false;
        }
        self.segments(range.end)
            .into_iter()
            .filter(|(r, _)| r.end > range.start)
            .all(|(_, m)| m.contains(mark))
    }

    /// Add (`on`) or clear `mark` over `range`.
    pub fn toggle(&mut self, range: Range<usize>, mark: Marks, on: bool) {
        if range.is_empty() {
            return;
        }
        let end = range.end.max(self.extent());
        let rebuilt = self
            .segments(end)
            .into_iter()
            .flat_map(|(r, m)| split_segment(r, m, &range))
            .map(|(r, m, inside)| {
                if inside {
                    let mut m = m;
                    m.set(mark, on);
                    (r, m)
                } else {
                    (r, m)
                }
            })
            .collect::<Vec<_>>();
        *self = Self::canonical(rebuilt);
    }

    /// Split at `byte`; `self` keeps the head, the shifted tail is returned.
    pub fn split_off(&mut self, byte: usize) -> Decoration {
        let mut head = Vec::new();
        let mut tail = Vec::new();
        for span in self.spans.drain(..) {
            if span.range.end <= byte {
                head.push(span);
            } else if span.range.start >= byte {
                tail.push(MarkSpan {
                    range: span.range.start - byte..span.range.end - byte,
                    marks: span.marks,
                });
            } else {
                head.push(MarkSpan {
                    range: span.range.start..byte,
                    marks: span.marks,
                });
                tail.push(MarkSpan {
                    range: 0..span.range.end - byte,
                    marks: span.marks,
                });
            }
        }
        self.spans = head;
        Decoration { spans: tail }
    }

    /// Append `tail`, whose offsets are relative to `shift` bytes into the merged text.
    pub fn append(&mut self, tail: Decoration, shift: usize) {
        let mut spans = std::mem::take(&mut self.spans)
            .into_iter()
            .map(|s| (s.range, s.marks))
            .collect::<Vec<_>>();
        spans.extend(
            tail.spans
                .into_iter()
                .map(|s| (s.range.start + shift..s.range.end + shift, s.marks)),
        );
        *self = Self::canonical(spans);
    }

    /// Account for `len` bytes inserted at `at`. Insertions strictly inside a span extend it.
    pub fn insert_gap(&mut self, at: usize, len: usize) {
        for span in &mut self.spans {
            if span.range.start >= at {
                span.range.start += len;
                span.range.end += len;
            } else if span.range.end > at {
                span.range.end += len;
            }
        }
    }

    /// Account for the bytes in `removed` being deleted from the text.
    pub fn remove(&mut self, removed: Range<usize>) {
        let len = removed.len();
        let map = |x: usize| {
            if x <= removed.start {
                x
            } else if x >= removed.end {
                x - len
            } else {
                removed.start
            }
        };
        let spans = std::mem::take(&mut self.spans)
            .into_iter()
            .map(|s| (map(s.range.start)..map(s.range.end), s.marks))
            .collect::<Vec<_>>();
        *self = Self::canonical(spans);
    }

    fn extent(&self) -> usize {
        self.spans.last().map(|s| s.range.end).unwrap_or(0)
    }

    fn assign(&mut self, range: Range<usize>, marks: Marks) {
        if range.is_empty() {
            return;
        }
        let end = range.end.max(self.extent());
        let rebuilt = self
            .segments(end)
            .into_iter()
            .flat_map(|(r, m)| split_segment(r, m, &range))
            .map(|(r, m, inside)| if inside { (r, marks) } else { (r, m) })
            .collect::<Vec<_>>();
        *self = Self::canonical(rebuilt);
    }

    /// Sorted, non-overlapping input assumed; drops empties and coalesces neighbours.
    fn canonical(segments: Vec<(Range<usize>, Marks)>) -> Self {
        let mut spans: Vec<MarkSpan> = Vec::with_capacity(segments.len());
        for (range, marks) in segments {
            if range.is_empty() || marks.is_empty() {
                continue;
            }
            if let Some(last) = spans.last_mut()
                && last.marks == marks
                && last.range.end == range.start
            {
                last.range.end = range.end;
                continue;
            }
            spans.push(MarkSpan { range, marks });
        }
        Self { spans }
    }
}

/// Cut `r` by the bounds of `sel`, tagging each piece with whether it lies inside `sel`.
fn split_segment(r: Range<usize>, m: Marks, sel: &Range<usize>) -> Vec<(Range<usize>, Marks, bool)> {
    let mut cuts = vec![r.start];
    for b in [sel.start, sel.end] {
        if b > r.start && b < r.end {
            cuts.push(b);
        }
    }
    cuts.push(r.end);
    cuts.windows(2)
        .map(|w| {
            let piece = w[0]..w[1];
            let inside = piece.start >= sel.start && piece.end <= sel.end;
            (piece, m, inside)
        })
        .collect()
}
