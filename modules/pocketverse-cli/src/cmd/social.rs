use anyhow::{Context, Result};
use pocketverse_common::{now_millis, Comment, Platform, SocialPost, StateEvent, USER_ID};

use super::show::{print_post, print_posts};
use crate::session::Session;

pub async fn moments(session: &mut Session) -> Result<()> {
    let posts = session.engine.refresh_moments(&session.view()).await?;
    if posts.is_empty() {
        println!("(朋友圈没有新动态)");
        return Ok(());
    }
    print_posts(&session.state, &posts);
    session.apply(StateEvent::PostsPublished(posts))
}

pub async fn weibo(session: &mut Session) -> Result<()> {
    let report = session.engine.refresh_weibo(&session.view()).await?;
    for output in &report.outputs {
        println!("{:<18} {} 条", output.stage().to_string(), output.len());
    }
    session.apply_all(report.into_events())?;
    print_posts(&session.state, session.state.posts(Platform::Weibo));
    Ok(())
}

/// Publish a post as the user; characters may answer in the comments.
pub async fn post(session: &mut Session, content: &str, platform: Platform) -> Result<()> {
    let post = SocialPost::new(USER_ID, content, platform, now_millis());
    session.apply(StateEvent::PostsPublished(vec![post.clone()]))?;
    reply_to(session, &post.id).await
}

pub async fn comment(session: &mut Session, post_id: &str, content: &str) -> Result<()> {
    let comment = Comment::new(USER_ID, session.state.user.name.clone(), content, now_millis());
    session.apply(StateEvent::CommentsAdded {
        post_id: post_id.to_string(),
        comments: vec![comment],
    })?;
    reply_to(session, post_id).await
}

pub fn like(session: &mut Session, post_id: &str) -> Result<()> {
    session.apply(StateEvent::PostLikeToggled {
        post_id: post_id.to_string(),
    })?;
    if let Some(post) = session.state.post(post_id) {
        print_post(&session.state, post);
    }
    Ok(())
}

// Let the roster react to the post as it now stands.
async fn reply_to(session: &mut Session, post_id: &str) -> Result<()> {
    let post = session
        .state
        .post(post_id)
        .cloned()
        .with_context(|| format!("Post {post_id} disappeared"))?;
    let comments = session.engine.auto_interactions(&session.view(), &post).await?;
    if !comments.is_empty() {
        session.apply(StateEvent::CommentsAdded {
            post_id: post_id.to_string(),
            comments,
        })?;
    }
    if let Some(post) = session.state.post(post_id) {
        print_post(&session.state, post);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::session_with;
    use pocketverse_world::testing::ScriptedModel;
    use std::sync::Arc;

    #[tokio::test]
    async fn user_post_gets_character_comments() {
        let model = Arc::new(ScriptedModel::new().reply(
            r#"{"interactions":[
                {"authorName":"沈逸 (Shen Yi)","content":"注意休息。"},
                {"authorName":"路人甲","content":"?"}
            ]}"#,
        ));
        let mut session = session_with(model);

        post(&mut session, "加班到深夜", Platform::Moments).await.unwrap();

        let latest = &session.state.posts(Platform::Moments)[0];
        assert_eq!(latest.content, "加班到深夜");
        assert_eq!(latest.author_id, USER_ID);
        assert_eq!(latest.comments.len(), 1);
        assert_eq!(latest.comments[0].author_id, "char1");
    }

    #[tokio::test]
    async fn comment_without_interactions_makes_no_call() {
        let model = Arc::new(ScriptedModel::new());
        let mut session = session_with(model.clone());
        session
            .apply(StateEvent::InteractionSettingsUpdated {
                enabled: false,
                max_replies: 4,
            })
            .unwrap();

        comment(&mut session, "post1", "好美的夜景").await.unwrap();

        assert_eq!(model.call_count(), 0);
        let post = session.state.post("post1").unwrap();
        let last = post.comments.last().unwrap();
        assert_eq!(last.author_id, USER_ID);
        assert_eq!(last.author_name, "我");
    }

    #[tokio::test]
    async fn comment_on_missing_post_fails() {
        let mut session = session_with(Arc::new(ScriptedModel::new()));
        assert!(comment(&mut session, "nope", "hi").await.is_err());
    }

    #[test]
    fn like_toggles() {
        let mut session = session_with(Arc::new(ScriptedModel::new()));
        let likes = session.state.post("post1").unwrap().likes;

        like(&mut session, "post1").unwrap();
        assert_eq!(session.state.post("post1").unwrap().likes, likes + 1);
        like(&mut session, "post1").unwrap();
        assert_eq!(session.state.post("post1").unwrap().likes, likes);
    }
}
