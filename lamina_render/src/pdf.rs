// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal single-page PDF output.
//!
//! The page holds one RGB image XObject with its alpha channel as a soft
//! mask, scaled to fill the page. Streams are stored uncompressed.

use std::fmt::Write as _;

use image::RgbaImage;
use kurbo::Size;

struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    /// Appends the next object. Objects are numbered from 1 in call order.
    fn object(&mut self, dict: &str, stream: Option<&[u8]>) {
        self.offsets.push(self.buf.len());
        let num = self.offsets.len();
        self.buf
            .extend_from_slice(format!("{num} 0 obj\n{dict}\n").as_bytes());
        if let Some(data) = stream {
            self.buf.extend_from_slice(b"stream\n");
            self.buf.extend_from_slice(data);
            self.buf.extend_from_slice(b"\nendstream\n");
        }
        self.buf.extend_from_slice(b"endobj\n");
    }

    fn finish(mut self, root: usize) -> Vec<u8> {
        let xref = self.buf.len();
        let count = self.offsets.len() + 1;
        let mut table = format!("xref\n0 {count}\n0000000000 65535 f \n");
        for offset in &self.offsets {
            let _ = writeln!(table, "{offset:010} 00000 n ");
        }
        let _ = write!(
            table,
            "trailer\n<< /Size {count} /Root {root} 0 R >>\nstartxref\n{xref}\n%%EOF\n"
        );
        self.buf.extend_from_slice(table.as_bytes());
        self.buf
    }
}

/// Encodes `image` as a one-page PDF whose media box is `page` points.
#[must_use]
pub fn encode_image_pdf(image: &RgbaImage, page: Size) -> Vec<u8> {
    let (width, height) = image.dimensions();
    let mut rgb = Vec::with_capacity(image.as_raw().len() / 4 * 3);
    let mut alpha = Vec::with_capacity(image.as_raw().len() / 4);
    for px in image.pixels() {
        let [r, g, b, a] = px.0;
        rgb.extend_from_slice(&[r, g, b]);
        alpha.push(a);
    }

    let content = format!("q\n{} 0 0 {} 0 0 cm\n/Im0 Do\nQ\n", page.width, page.height);

    let mut pdf = PdfWriter::new();
    pdf.object("<< /Type /Catalog /Pages 2 0 R >>", None);
    pdf.object("<< /Type /Pages /Kids [3 0 R] /Count 1 >>", None);
    pdf.object(
        &format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
             /Resources << /XObject << /Im0 4 0 R >> >> /Contents 6 0 R >>",
            page.width, page.height
        ),
        None,
    );
    pdf.object(
        &format!(
            "<< /Type /XObject /Subtype /Image /Width {width} /Height {height} \
             /ColorSpace /DeviceRGB /BitsPerComponent 8 /SMask 5 0 R /Length {} >>",
            rgb.len()
        ),
        Some(&rgb),
    );
    pdf.object(
        &format!(
            "<< /Type /XObject /Subtype /Image /Width {width} /Height {height} \
             /ColorSpace /DeviceGray /BitsPerComponent 8 /Length {} >>",
            alpha.len()
        ),
        Some(&alpha),
    );
    pdf.object(
        &format!("<< /Length {} >>", content.len()),
        Some(content.as_bytes()),
    );
    pdf.finish(1)
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    fn text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[test]
    fn document_structure() {
        let image = RgbaImage::from_pixel(2, 1, Rgba([10, 20, 30, 40]));
        let pdf = encode_image_pdf(&image, Size::new(200.0, 100.0));
        let s = text(&pdf);

        assert!(pdf.starts_with(b"%PDF-1.4\n"));
        assert!(s.ends_with("%%EOF\n"));
        assert!(s.contains("/MediaBox [0 0 200 100]"));
        assert!(s.contains("/Width 2 /Height 1"));
        assert!(s.contains("/SMask 5 0 R"));
        assert!(s.contains("200 0 0 100 0 0 cm"));
    }

    fn rfind(hay: &[u8], needle: &[u8]) -> Option<usize> {
        hay.windows(needle.len()).rposition(|w| w == needle)
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let image = RgbaImage::from_pixel(3, 3, Rgba([255, 0, 0, 255]));
        let pdf = encode_image_pdf(&image, Size::new(3.0, 3.0));

        let marker = rfind(&pdf, b"startxref\n").unwrap() + b"startxref\n".len();
        let tail = text(&pdf[marker..]);
        let start: usize = tail.lines().next().unwrap().parse().unwrap();
        let table = text(&pdf[start..]);
        assert!(table.starts_with("xref\n0 7\n"));

        let entries: Vec<usize> = table
            .lines()
            .skip(3)
            .take(6)
            .map(|l| l[..10].parse().unwrap())
            .collect();
        for (i, &offset) in entries.iter().enumerate() {
            let expected = format!("{} 0 obj", i + 1);
            assert!(
                pdf[offset..].starts_with(expected.as_bytes()),
                "object {}",
                i + 1
            );
        }
    }
}
