//! Lossless WebP encoding for RGB tiles.

/// Encode interleaved RGB bytes as a lossless WebP image.
pub fn create_webp_lossless(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, String> {
    if pixels.len() != width * height * 3 {
        return Err(format!(
            "expected {} RGB bytes for {}x{}, got {}",
            width * height * 3,
            width,
            height,
            pixels.len()
        ));
    }

    let encoder = ::webp::Encoder::from_rgb(pixels, width as u32, height as u32);
    let webp_data = encoder
        .encode_simple(true, 100.0)
        .map_err(|e| format!("WebP encoding failed: {:?}", e))?;
    Ok(webp_data.to_vec())
}
