//! User-facing message texts.

/// Callback token carried by the "How to use" button.
pub const HELP_CALLBACK: &str = "help";

pub const HELP_BUTTON: &str = "📖 How to use";
pub const DEVELOPER_BUTTON: &str = "👨‍💻 Developer";

pub const WELCOME: &str = "Hi! 👋\n\n\
I download Reels, videos and photos from Instagram.\n\
Just send me a public link to a post or Reel and I'll send the content back to you.\n\n\
Fast and free 🚀";

pub const HELP: &str = "📖 How to use:\n\n\
1. Open Instagram\n\
2. Find the Reel, video or photo you want\n\
3. Tap «Share» → «Copy link»\n\
4. Send that link to me\n\n\
I'll send you the video or photo!\n\n\
Note: only public accounts are supported.";

pub const NOT_A_LINK: &str =
    "❌ This is not an Instagram link. Send a link like:\nhttps://www.instagram.com/reel/ABC123/";

pub const DOWNLOADING: &str = "⏳ Downloading… please wait a moment";

pub const DELIVERED: &str = "✅ Done! The content is above 👆";

pub const NOTHING_FOUND: &str =
    "😔 Couldn't find any video or photo. The post may be private or empty.";

pub const PRIVATE_PROFILE: &str =
    "🔒 This account is private. I can only download from public profiles.";

pub const LOGIN_REQUIRED: &str =
    "🔒 This post requires logging in. For now I only work with public posts.";

pub const DEFAULT_VIDEO_CAPTION: &str = "🎥 Your Reel/video from Instagram!\nDeveloper: @back2hood";

pub const DEFAULT_PHOTO_CAPTION: &str = "📸 Your photo from Instagram!\nDeveloper: @back2hood";

pub const DEFAULT_DEVELOPER_URL: &str = "https://t.me/back2hood";

/// Status text for a failure without a dedicated message.
#[must_use]
pub fn generic_error(detail: &str) -> String {
    format!("❌ Error: {detail}\nTry another link or try again later.")
}
