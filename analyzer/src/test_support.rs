//! Fixtures shared by the unit tests here and by the `api` crate's tests.

/// Builds a one-page PDF with a single line of Helvetica text, padded with a
/// comment line after the header so the file is at least `min_len` bytes.
pub fn single_page_pdf(text: &str, min_len: usize) -> Vec<u8> {
    let unpadded = assemble_pdf(text, 0);
    if min_len <= unpadded.len() {
        return unpadded;
    }
    // the comment line adds `%` and a newline around the padding
    let padding = (min_len - unpadded.len()).saturating_sub(2).max(1);
    assemble_pdf(text, padding)
}

fn assemble_pdf(text: &str, padding: usize) -> Vec<u8> {
    let stream = format!("BT /F1 12 Tf 72 712 Td ({}) Tj ET", text);
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >>".to_string(),
        format!("<< /Length {} >>\nstream\n{}\nendstream", stream.len(), stream),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    if padding > 0 {
        pdf.push(b'%');
        pdf.extend(std::iter::repeat(b' ').take(padding));
        pdf.push(b'\n');
    }

    let mut offsets = Vec::new();
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_at = pdf.len();
    let mut tail = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        tail.push_str(&format!("{:010} 00000 n \n", offset));
    }
    tail.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_at
    ));
    pdf.extend_from_slice(tail.as_bytes());
    pdf
}
