/// Split text into retrieval-sized chunks. Sections (double-newline
/// separated) that fit within `chunk_size` are kept whole so a coherent
/// block like one job entry is never split; longer sections are windowed
/// greedily with `overlap` characters carried between windows.
///
/// Windowing is char-indexed, not byte-indexed.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    debug_assert!(overlap < chunk_size);

    let sections = text
        .split("\n\n")
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let mut chunks = Vec::new();
    for section in sections {
        let chars: Vec<char> = section.chars().collect();
        if chars.len() <= chunk_size {
            chunks.push(section.to_string());
            continue;
        }

        let step = chunk_size - overlap;
        let mut start = 0;
        while start < chars.len() {
            let end = (start + chunk_size).min(chars.len());
            chunks.push(chars[start..end].iter().collect());
            start += step;
        }
    }

    chunks
}
