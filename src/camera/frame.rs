//! Raw frame type representing one captured camera image.

/// A single raw frame from the camera.
///
/// Carries the luma (brightness) plane together with the geometry
/// needed to interpret it. The plane is row-major with `stride` bytes
/// per row; rows may be padded, so `stride >= width`.
///
/// Frames are owned values: the source builds one, hands it to the
/// pipeline, and the pipeline drops it at the end of one analysis
/// cycle. Nothing retains a frame longer than that.
#[derive(Clone)]
pub struct RawFrame {
    /// Luma plane, one unsigned 8-bit sample per pixel, row-major.
    luma: Vec<u8>,
    /// Frame width in pixels.
    width: u32,
    /// Frame height in pixels.
    height: u32,
    /// Bytes per row, including any padding.
    stride: u32,
    /// Capture time in monotonic milliseconds.
    timestamp_ms: u64,
}

impl RawFrame {
    /// Creates a frame with a tightly packed plane (`stride == width`).
    pub fn new(luma: Vec<u8>, width: u32, height: u32, timestamp_ms: u64) -> Self {
        Self::with_stride(luma, width, height, width, timestamp_ms)
    }

    /// Creates a frame with an explicit row stride.
    pub fn with_stride(
        luma: Vec<u8>,
        width: u32,
        height: u32,
        stride: u32,
        timestamp_ms: u64,
    ) -> Self {
        Self {
            luma,
            width,
            height,
            stride,
            timestamp_ms,
        }
    }

    /// Returns the full luma plane, padding included.
    #[inline]
    pub fn luma(&self) -> &[u8] {
        &self.luma
    }

    /// Returns the frame width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the frame height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the row stride in bytes.
    #[inline]
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Returns the capture time in monotonic milliseconds.
    #[inline]
    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }

    /// Returns the plane length the geometry implies (`stride * height`).
    #[inline]
    pub fn expected_len(&self) -> usize {
        (self.stride as usize) * (self.height as usize)
    }

    /// Validates that the plane matches the declared geometry.
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.stride >= self.width
            && self.luma.len() == self.expected_len()
    }
}

impl std::fmt::Debug for RawFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("timestamp_ms", &self.timestamp_ms)
            .field("plane_bytes", &self.luma.len())
            .finish()
    }
}
