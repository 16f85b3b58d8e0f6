use std::path::PathBuf;
use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) struct TestPage {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) stream: String,
}

pub(crate) fn unique_temp_path(suffix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();

    let mut path = std::env::temp_dir();
    path.push(format!("prc_{suffix}_{}_{}", process::id(), nanos));
    path
}

/// A page painted edge to edge with one color.
pub(crate) fn filled_page(width: u32, height: u32, rgb: (f32, f32, f32)) -> TestPage {
    let (r, g, b) = rgb;
    TestPage {
        width,
        height,
        stream: format!("{r} {g} {b} rg 0 0 {width} {height} re f"),
    }
}

/// A page whose upper half is `top` and lower half is `bottom`.
pub(crate) fn split_page(
    width: u32,
    height: u32,
    top: (f32, f32, f32),
    bottom: (f32, f32, f32),
) -> TestPage {
    let half = height / 2;
    TestPage {
        width,
        height,
        stream: format!(
            "{} {} {} rg 0 {half} {width} {} re f {} {} {} rg 0 0 {width} {half} re f",
            top.0,
            top.1,
            top.2,
            height - half,
            bottom.0,
            bottom.1,
            bottom.2
        ),
    }
}

/// Serializes `pages` into a minimal single-revision PDF.
///
/// Object 1 is the catalog, object 2 the page tree, then each page is
/// followed by its content stream.
pub(crate) fn build_pdf(pages: &[TestPage]) -> Vec<u8> {
    let page_id = |index: usize| 3 + index * 2;
    let kids: Vec<String> = (0..pages.len())
        .map(|index| format!("{} 0 R", page_id(index)))
        .collect();

    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        ),
    ];
    for (index, page) in pages.iter().enumerate() {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Resources << >> /Contents {} 0 R >>",
            page.width,
            page.height,
            page_id(index) + 1
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            page.stream.len(),
            page.stream
        ));
    }

    let mut out = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for (index, object) in objects.iter().enumerate() {
        xref.push_str(&format!("{:010} 00000 n \n", out.len()));
        out.extend_from_slice(format!("{} 0 obj\n{object}\nendobj\n", index + 1).as_bytes());
    }

    let xref_start = out.len();
    out.extend_from_slice(xref.as_bytes());
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_start}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );
    out
}
