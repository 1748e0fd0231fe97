/// Splits document text into chunks sized for embedding.
///
/// Segments between separators are packed greedily up to `chunk_size`
/// bytes; the trailing `chunk_overlap` bytes of each emitted chunk are
/// carried into the next one. Oversized single segments are hard-split by
/// length. All boundaries respect UTF-8 character limits.
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separator: String,
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            separator: "\n".to_string(),
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        if text.len() <= self.chunk_size {
            return vec![text.to_string()];
        }

        let mut chunks = Vec::new();
        let mut current = String::new();

        for segment in text.split(self.separator.as_str()) {
            if segment.len() > self.chunk_size {
                if !current.is_empty() {
                    chunks.push(std::mem::take(&mut current));
                }
                chunks.extend(self.split_by_length(segment));
                continue;
            }

            let joined_len = if current.is_empty() {
                segment.len()
            } else {
                current.len() + self.separator.len() + segment.len()
            };

            if joined_len > self.chunk_size && !current.is_empty() {
                let overlap = self.overlap_tail(&current);
                chunks.push(std::mem::take(&mut current));
                current = overlap;
            }

            if !current.is_empty() {
                current.push_str(&self.separator);
            }
            current.push_str(segment);
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        chunks
    }

    fn overlap_tail(&self, chunk: &str) -> String {
        if self.chunk_overlap == 0 || chunk.len() <= self.chunk_overlap {
            return String::new();
        }

        let mut start = chunk.len() - self.chunk_overlap;
        while start > 0 && !chunk.is_char_boundary(start) {
            start -= 1;
        }
        chunk[start..].to_string()
    }

    fn split_by_length(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < text.len() {
            let mut end = (start + self.chunk_size).min(text.len());
            while end > start && !text.is_char_boundary(end) {
                end -= 1;
            }

            chunks.push(text[start..end].to_string());

            if end == text.len() {
                break;
            }

            let mut next = end.saturating_sub(self.chunk_overlap.min(end - start));
            while next > start && !text.is_char_boundary(next) {
                next -= 1;
            }
            // Overlap must not stall the scan.
            start = if next > start { next } else { end };
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        let splitter = TextSplitter::new(100, 10);
        let chunks = splitter.split_text("short text");
        assert_eq!(chunks, vec!["short text".to_string()]);
    }

    #[test]
    fn test_chunks_respect_the_size_limit() {
        let splitter = TextSplitter::new(20, 0);
        let text = "line one\nline two\nline three\nline four";
        let chunks = splitter.split_text(text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.len() <= 20);
        }
    }

    #[test]
    fn test_consecutive_chunks_overlap() {
        let splitter = TextSplitter::new(20, 8);
        let text = "aaaa\nbbbb\ncccc\ndddd\neeee\nffff";
        let chunks = splitter.split_text(text);

        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let tail: String = pair[0].chars().rev().take(4).collect::<String>().chars().rev().collect();
            assert!(
                pair[1].contains(&tail),
                "chunk {:?} does not carry the tail of {:?}",
                pair[1],
                pair[0]
            );
        }
    }

    #[test]
    fn test_oversized_segment_is_hard_split() {
        let splitter = TextSplitter::new(10, 0);
        let text = "abcdefghijklmnopqrstuvwxyz";
        let chunks = splitter.split_text(text);

        assert_eq!(chunks, vec!["abcdefghij", "klmnopqrst", "uvwxyz"]);
    }

    #[test]
    fn test_hard_split_respects_char_boundaries() {
        let splitter = TextSplitter::new(5, 0);
        // Multi-byte characters: no chunk boundary may fall inside one.
        let text = "ééééééé";
        let chunks = splitter.split_text(text);

        assert_eq!(chunks.concat(), text);
        for chunk in &chunks {
            assert!(!chunk.is_empty());
        }
    }

    #[test]
    fn test_custom_separator() {
        let splitter = TextSplitter::new(12, 0).with_separator(". ");
        let text = "one. two. three. four. five";
        let chunks = splitter.split_text(text);

        assert!(chunks.len() > 1);
        assert!(chunks[0].starts_with("one"));
    }
}
