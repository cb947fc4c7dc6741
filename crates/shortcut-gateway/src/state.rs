use shortcut_auth::IdentityCodec;
use shortcut_shortener::ShortenerService;

#[derive(Debug, Clone)]
pub struct AppState {
    shortener: ShortenerService,
    codec: IdentityCodec,
}

impl AppState {
    pub fn new(shortener: ShortenerService, codec: IdentityCodec) -> Self {
        Self { shortener, codec }
    }

    pub fn shortener(&self) -> &ShortenerService {
        &self.shortener
    }

    pub fn codec(&self) -> &IdentityCodec {
        &self.codec
    }
}
