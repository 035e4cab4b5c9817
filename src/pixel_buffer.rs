// ============================================================================
// PixelBuffer
// ============================================================================

/// Packed-pixel frame buffer.
///
/// Each `u32` holds one opaque pixel whose little-endian bytes are R, G, B, A,
/// so the raw bytes can be uploaded to an ABGR8888 streaming texture as-is.
/// Allocated once per resize and reused every frame.
pub struct PixelBuffer {
    pixels: Vec<u32>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; (width * height) as usize],
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row
    #[inline]
    pub fn pitch(&self) -> usize {
        self.width as usize * 4
    }

    /// Check if coordinates are within bounds
    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Fill every pixel with one packed value
    pub fn clear(&mut self, pixel: u32) {
        self.pixels.fill(pixel);
    }

    /// Read a packed pixel (bounds checked)
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<u32> {
        if self.in_bounds(x, y) {
            Some(self.pixels[(y as u32 * self.width + x as u32) as usize])
        } else {
            None
        }
    }

    /// Read a pixel as (r, g, b)
    pub fn get_rgb(&self, x: i32, y: i32) -> Option<(u8, u8, u8)> {
        self.get(x, y).map(|px| {
            let [r, g, b, _] = px.to_le_bytes();
            (r, g, b)
        })
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Raw bytes for texture upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}
