// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Embed provider families: playback URL policy and the `postMessage` bridge.
//!
//! A [`ProviderFamily`] is recognized from the URL's host. Recognized URLs
//! get their query string replaced by a canonical parameter set that asks the
//! provider to autoplay without controls or related content
//! ([`resolve_playback_url`]). The same family also knows how to subscribe to
//! its player's events and how to decode them ([`parse_embed_message`]),
//! which is how the page learns that an item has finished.
//!
//! Resolution always strips before appending, so it is idempotent:
//! `resolve_playback_url(&resolve_playback_url(u)) == resolve_playback_url(u)`.

use alloc::borrow::Cow;
use alloc::string::String;

use serde_json::Value;

/// Query appended to YouTube embed URLs.
pub const YOUTUBE_PARAMS: &str = "autoplay=1&enablejsapi=1&controls=0&modestbranding=1&rel=0&fs=0&iv_load_policy=3&disablekb=1";

/// Query appended to Vimeo player URLs.
pub const VIMEO_PARAMS: &str = "autoplay=1&controls=0&background=0";

/// YouTube player state reported when a video has ended.
const YOUTUBE_STATE_ENDED: i64 = 0;

/// A recognized class of embeddable-video hosting service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderFamily {
    /// `youtube.com` and `youtube-nocookie.com`.
    ///
    /// The `youtu.be` short host is a share link, not a player, and is left
    /// alone.
    YouTube,
    /// `vimeo.com` and `player.vimeo.com`.
    Vimeo,
}

impl ProviderFamily {
    /// Detects the family from the host part of `url`.
    #[must_use]
    pub fn detect(url: &str) -> Option<Self> {
        let host = host_of(url);
        if host.contains("youtube.com") || host.contains("youtube-nocookie.com") {
            Some(Self::YouTube)
        } else if host.contains("vimeo.com") {
            Some(Self::Vimeo)
        } else {
            None
        }
    }

    /// Canonical autoplay query for this family.
    #[must_use]
    pub const fn playback_params(self) -> &'static str {
        match self {
            Self::YouTube => YOUTUBE_PARAMS,
            Self::Vimeo => VIMEO_PARAMS,
        }
    }

    /// Returns `true` if a `message` event from `origin` may come from this
    /// family's player iframe.
    #[must_use]
    pub fn accepts_origin(self, origin: &str) -> bool {
        let host = host_of(origin);
        match self {
            Self::YouTube => {
                host.ends_with("youtube.com") || host.ends_with("youtube-nocookie.com")
            }
            Self::Vimeo => host.ends_with("vimeo.com"),
        }
    }

    /// The message to post into the player iframe so that it starts
    /// reporting playback events. `listener_id` distinguishes mounts.
    #[must_use]
    pub fn subscribe_message(self, listener_id: u64) -> String {
        match self {
            Self::YouTube => alloc::format!(
                r#"{{"event":"listening","id":{listener_id},"channel":"widget"}}"#
            ),
            Self::Vimeo => String::from(r#"{"method":"addEventListener","value":"ended"}"#),
        }
    }
}

/// A playback event decoded from an embed `postMessage`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmbedSignal {
    /// The player finished loading and accepts commands.
    Ready,
    /// The current video played to the end.
    Ended,
}

/// Rewrites `url` into the URL the player iframe should load.
///
/// Recognized families get their query string (and anything after it)
/// replaced with [`ProviderFamily::playback_params`]; other URLs are
/// returned unchanged.
#[must_use]
pub fn resolve_playback_url(url: &str) -> Cow<'_, str> {
    match ProviderFamily::detect(url) {
        Some(family) => {
            let base = strip_query(url);
            Cow::Owned(alloc::format!("{base}?{}", family.playback_params()))
        }
        None => Cow::Borrowed(url),
    }
}

/// Decodes a `postMessage` payload sent by a `family` player.
///
/// Returns `None` for payloads that are not JSON or carry events the session
/// does not act on.
#[must_use]
pub fn parse_embed_message(family: ProviderFamily, data: &str) -> Option<EmbedSignal> {
    let value: Value = serde_json::from_str(data).ok()?;
    let event = value.get("event")?.as_str()?;
    match family {
        ProviderFamily::YouTube => match event {
            "onReady" => Some(EmbedSignal::Ready),
            "onStateChange" => youtube_state(value.get("info")?),
            "infoDelivery" => youtube_state(value.get("info")?.get("playerState")?),
            _ => None,
        },
        ProviderFamily::Vimeo => match event {
            "ready" => Some(EmbedSignal::Ready),
            "ended" => Some(EmbedSignal::Ended),
            _ => None,
        },
    }
}

fn youtube_state(state: &Value) -> Option<EmbedSignal> {
    (state.as_i64()? == YOUTUBE_STATE_ENDED).then_some(EmbedSignal::Ended)
}

/// Returns `url` cut at its first `?`.
#[must_use]
pub fn strip_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}

/// Returns the host portion of `url`, without userinfo or port.
///
/// Accepts URLs with or without a scheme; `//host/path` is handled too.
pub(crate) fn host_of(url: &str) -> &str {
    let rest = url
        .split_once("://")
        .map_or(url, |(_, rest)| rest)
        .trim_start_matches('/');
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..end];
    let authority = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    authority.split_once(':').map_or(authority, |(host, _)| host)
}

#[cfg(test)]
mod tests {
    use super::*;

    const YT: &str = "https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1&enablejsapi=1";
    const VIMEO: &str = "https://player.vimeo.com/video/76979871?h=8272103f6e";

    #[test]
    fn detects_families_by_host() {
        assert_eq!(ProviderFamily::detect(YT), Some(ProviderFamily::YouTube));
        assert_eq!(ProviderFamily::detect("https://youtu.be/dQw4w9WgXcQ"), None);
        assert_eq!(ProviderFamily::detect(VIMEO), Some(ProviderFamily::Vimeo));
        assert_eq!(ProviderFamily::detect("https://example.com/youtube.com/x"), None);
    }

    #[test]
    fn youtube_query_is_replaced() {
        let resolved = resolve_playback_url(YT);
        assert_eq!(
            resolved,
            alloc::format!("https://www.youtube.com/embed/dQw4w9WgXcQ?{YOUTUBE_PARAMS}")
        );
    }

    #[test]
    fn vimeo_query_is_replaced() {
        assert_eq!(
            resolve_playback_url(VIMEO),
            "https://player.vimeo.com/video/76979871?autoplay=1&controls=0&background=0"
        );
    }

    #[test]
    fn unknown_urls_pass_through() {
        let url = "https://cdn.example.com/clip.mp4?token=abc";
        assert!(matches!(resolve_playback_url(url), Cow::Borrowed(u) if u == url));
    }

    #[test]
    fn short_links_pass_through() {
        let url = "https://youtu.be/dQw4w9WgXcQ?t=3";
        assert!(
            matches!(resolve_playback_url(url), Cow::Borrowed(u) if u == url),
            "short link was rewritten"
        );
    }

    #[test]
    fn resolution_is_idempotent() {
        for url in [YT, VIMEO, "https://www.youtube.com/embed/abc", "https://x.test/a?b"] {
            let once = resolve_playback_url(url).into_owned();
            let twice = resolve_playback_url(&once).into_owned();
            assert_eq!(once, twice, "resolving {url} twice changed it");
        }
    }

    #[test]
    fn host_parsing_handles_ports_and_userinfo() {
        assert_eq!(host_of("https://user@www.youtube.com:443/embed/x"), "www.youtube.com");
        assert_eq!(host_of("//player.vimeo.com/video/1"), "player.vimeo.com");
        assert_eq!(host_of("youtu.be/abc"), "youtu.be");
    }

    #[test]
    fn youtube_messages_decode() {
        let yt = ProviderFamily::YouTube;
        assert_eq!(parse_embed_message(yt, r#"{"event":"onReady","id":1}"#), Some(EmbedSignal::Ready));
        assert_eq!(
            parse_embed_message(yt, r#"{"event":"onStateChange","info":0}"#),
            Some(EmbedSignal::Ended)
        );
        assert_eq!(parse_embed_message(yt, r#"{"event":"onStateChange","info":1}"#), None);
        assert_eq!(
            parse_embed_message(yt, r#"{"event":"infoDelivery","info":{"playerState":0}}"#),
            Some(EmbedSignal::Ended)
        );
        assert_eq!(parse_embed_message(yt, "not json"), None);
    }

    #[test]
    fn vimeo_messages_decode() {
        let vimeo = ProviderFamily::Vimeo;
        assert_eq!(
            parse_embed_message(vimeo, r#"{"event":"ended","data":{"seconds":12.5}}"#),
            Some(EmbedSignal::Ended)
        );
        assert_eq!(parse_embed_message(vimeo, r#"{"event":"ready"}"#), Some(EmbedSignal::Ready));
        assert_eq!(parse_embed_message(vimeo, r#"{"event":"timeupdate"}"#), None);
    }

    #[test]
    fn origins_are_checked_per_family() {
        assert!(ProviderFamily::YouTube.accepts_origin("https://www.youtube.com"));
        assert!(ProviderFamily::YouTube.accepts_origin("https://www.youtube-nocookie.com"));
        assert!(!ProviderFamily::YouTube.accepts_origin("https://player.vimeo.com"));
        assert!(ProviderFamily::Vimeo.accepts_origin("https://player.vimeo.com"));
    }

    #[test]
    fn subscribe_messages_are_json() {
        let yt = ProviderFamily::YouTube.subscribe_message(7);
        let value: Value = serde_json::from_str(&yt).unwrap();
        assert_eq!(value["event"], "listening");
        assert_eq!(value["id"], 7);
        let vimeo: Value =
            serde_json::from_str(&ProviderFamily::Vimeo.subscribe_message(0)).unwrap();
        assert_eq!(vimeo["value"], "ended");
    }
}
