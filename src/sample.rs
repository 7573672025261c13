//! Built-in sample posts and JSON dataset loading.
//!
//! The feed has no backend; it pages through either the bundled sample set or a
//! JSON array of posts supplied with `--posts`.

use crate::feed::{Achievement, Post, PostId};
use std::path::Path;
use thiserror::Error;

/// Largest dataset file accepted (4 MiB).
const MAX_DATASET_SIZE: u64 = 4 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read posts file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid posts JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Posts file too large: {size} bytes (max {max} bytes)")]
    TooLarge { size: u64, max: u64 },
}

/// Load a JSON array of posts from `path`.
///
/// Ids in the file are ignored; the feed assigns its own when posts are buffered.
/// A post marked liked with a zero like count is counted as liked once, so
/// unliking and liking again returns it to the same state.
pub fn load_posts(path: &Path) -> Result<Vec<Post>, DatasetError> {
    let size = std::fs::metadata(path)?.len();
    if size > MAX_DATASET_SIZE {
        return Err(DatasetError::TooLarge {
            size,
            max: MAX_DATASET_SIZE,
        });
    }
    let content = std::fs::read_to_string(path)?;
    let mut posts: Vec<Post> = serde_json::from_str(&content)?;
    for post in posts.iter_mut().filter(|p| p.is_liked && p.likes == 0) {
        tracing::debug!(author = %post.author, "Liked post has no likes, counting one");
        post.likes = 1;
    }
    tracing::info!(path = %path.display(), count = posts.len(), "Loaded posts file");
    Ok(posts)
}

fn post(author: &str, handle: &str, avatar: &str, content: &str, timestamp: &str) -> Post {
    Post {
        id: PostId::default(),
        author: author.to_string(),
        handle: handle.to_string(),
        avatar: avatar.to_string(),
        content: content.to_string(),
        timestamp: timestamp.to_string(),
        image: None,
        gallery: None,
        achievement: None,
        likes: 0,
        comments: 0,
        reposts: 0,
        earnings: None,
        is_liked: false,
        is_bookmarked: false,
    }
}

/// The bundled sample feed.
pub fn sample_posts() -> Vec<Post> {
    vec![
        Post {
            likes: 234,
            comments: 56,
            reposts: 12,
            earnings: Some("50 $CTE".to_string()),
            achievement: Some(Achievement {
                title: "Top Earner".to_string(),
                description: "Earned over 1000 $CTE this week".to_string(),
            }),
            ..post(
                "Sarah Chen",
                "@sarahchen",
                "https://images.unsplash.com/photo-1494790108377-be9c29b29330?w=150",
                "Just earned 50 $CTE for my latest thread on Web3 innovations! 🚀\n\nLoving how Chat To Earn rewards quality content. Who else is building in the space? Let's connect! 💫",
                "2h ago",
            )
        },
        Post {
            image: Some(
                "https://images.unsplash.com/photo-1569437061241-a848be43cc82?w=800".to_string(),
            ),
            likes: 567,
            comments: 89,
            reposts: 45,
            earnings: Some("75 $CTE".to_string()),
            ..post(
                "Alex Rivera",
                "@arivera",
                "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=150",
                "Check out my latest NFT collection dropping next week! 🎨✨",
                "4h ago",
            )
        },
        Post {
            gallery: Some(vec![
                "https://images.unsplash.com/photo-1642751227050-feb02d648136?w=800".to_string(),
                "https://images.unsplash.com/photo-1642751227053-e40b80cc5d73?w=800".to_string(),
                "https://images.unsplash.com/photo-1642751227011-3bf7f711b10c?w=800".to_string(),
            ]),
            likes: 890,
            comments: 123,
            reposts: 67,
            earnings: Some("120 $CTE".to_string()),
            ..post(
                "Maria Thompson",
                "@mariath",
                "https://images.unsplash.com/photo-1438761681033-6461ffad8d80?w=150",
                "Just launched my first dApp on Solana! Here's a sneak peek of the interface 👀",
                "6h ago",
            )
        },
        Post {
            likes: 445,
            comments: 78,
            reposts: 23,
            earnings: Some("150 $CTE".to_string()),
            achievement: Some(Achievement {
                title: "Milestone Achieved".to_string(),
                description: "Reached 1000 $CTE earnings".to_string(),
            }),
            ..post(
                "David Kim",
                "@dkim",
                "https://images.unsplash.com/photo-1500648767791-00dcc994a43e?w=150",
                "Just hit 1000 $CTE! 🎉 Thanks to everyone who's been engaging with my content. Here's to the next milestone! 🚀",
                "8h ago",
            )
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_posts_shape() {
        let posts = sample_posts();
        assert_eq!(posts.len(), 4);
        assert!(posts.iter().all(|p| !p.is_liked && !p.is_bookmarked));
        assert!(posts[0].achievement.is_some());
        assert!(posts[1].image.is_some());
        assert_eq!(posts[2].gallery.as_ref().map(Vec::len), Some(3));
        assert!(posts.iter().all(|p| p.handle.starts_with('@')));
    }

    #[test]
    fn test_load_posts_round_trip() {
        let dir = std::env::temp_dir().join("tidefeed_dataset_test_roundtrip");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("posts.json");
        std::fs::write(&path, serde_json::to_string(&sample_posts()).unwrap()).unwrap();

        let posts = load_posts(&path).unwrap();
        assert_eq!(posts, sample_posts());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_posts_invalid_json() {
        let dir = std::env::temp_dir().join("tidefeed_dataset_test_invalid");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("posts.json");
        std::fs::write(&path, "{ not an array").unwrap();

        let err = load_posts(&path).unwrap_err();
        assert!(matches!(err, DatasetError::Parse(_)));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_posts_counts_own_like() {
        let dir = std::env::temp_dir().join("tidefeed_dataset_test_liked");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("posts.json");
        std::fs::write(
            &path,
            r#"[{"author": "Ada", "handle": "@ada", "content": "hi", "isLiked": true, "likes": 0}]"#,
        )
        .unwrap();

        let mut posts = load_posts(&path).unwrap();
        assert_eq!(posts[0].likes, 1);
        posts[0].toggle_like();
        assert_eq!((posts[0].is_liked, posts[0].likes), (false, 0));
        posts[0].toggle_like();
        assert_eq!((posts[0].is_liked, posts[0].likes), (true, 1));

        std::fs::remove_dir_all(&dir).ok();
    }

        #[test]
    fn test_load_posts_missing_file() {
        let err = load_posts(Path::new("/tmp/tidefeed_no_such_posts.json")).unwrap_err();
        assert!(matches!(err, DatasetError::Io(_)));
    }
}
