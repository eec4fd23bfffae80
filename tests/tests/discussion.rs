use agora_client::{
    api::{
        Error, RankMode, RemoteError, Store, Target, ThreadScope, VoteDirection, VoteRecord,
    },
    ClientConfig, Discussion, InteractionStore, Liveness, ThreadList,
};
use agora_mock_server::MockServer;
use tests::Forum;

#[tokio::test]
async fn load_vote_and_reply() {
    let f = Forum::new();
    let top = f.comment(None, 300);
    let reply = f.comment(Some(top), 200);
    let deep = f.comment(Some(reply), 100);
    let other_top = f.comment(None, 50);
    f.server
        .add_vote(VoteRecord::now(Target::Comment(top), f.bob, VoteDirection::Up));
    f.server
        .add_vote(VoteRecord::now(Target::Thread(f.thread), f.bob, VoteDirection::Down));

    let view = Liveness::new();
    let interactions = InteractionStore::new(f.server.clone(), Some(f.alice), view.clone());
    let mut d = Discussion::load(
        &*f.server,
        f.thread,
        Some(f.alice),
        &ClientConfig::default(),
        Some(&interactions),
        &view,
    )
    .await
    .unwrap();
    assert!(d.errors.is_empty());
    assert_eq!(d.thread_tally.score, -1);
    assert_eq!(
        d.tree.walk().map(|n| (n.id(), n.level)).collect::<Vec<_>>(),
        vec![(other_top, 0), (top, 0), (reply, 1), (deep, 2)],
    );
    assert_eq!(d.tree.get(&top).unwrap().score, 1);
    assert_eq!(
        interactions.get_state(Target::Comment(top)).current.score,
        1
    );
    assert_eq!(
        interactions.get_state(Target::Thread(f.thread)).current.score,
        -1
    );

    // alice upvotes the top comment, and the page shows it
    let s = d
        .vote(&interactions, Target::Comment(top), VoteDirection::Up)
        .await
        .unwrap();
    assert_eq!(s.current.score, 2);
    assert_eq!(s.current.vote, Some(VoteDirection::Up));
    assert_eq!(f.server.votes_of(f.alice, Target::Comment(top)).len(), 1);
    let node = d.tree.get(&top).unwrap();
    assert_eq!((node.score, node.user_vote), (2, Some(VoteDirection::Up)));

    // and cancels bob's downvote on the thread
    let s = d
        .vote(&interactions, Target::Thread(f.thread), VoteDirection::Up)
        .await
        .unwrap();
    assert_eq!(s.current.score, 0);
    assert_eq!(d.thread_tally.score, 0);
    assert_eq!(d.thread_tally.user_vote, Some(VoteDirection::Up));

    // and replies to it
    let node = d
        .submit_comment(
            &*f.server,
            Some(f.alice),
            Some(top),
            String::from("indeed"),
            &view,
        )
        .await
        .unwrap();
    assert_eq!(node.level, 1);
    assert_eq!(node.record.parent_id, Some(top));
    let new_reply = node.id();
    assert_eq!(
        d.tree.children(&top).map(|n| n.id()).collect::<Vec<_>>(),
        vec![new_reply, reply],
    );

    // reloading reflects both
    let d = Discussion::load(
        &*f.server,
        f.thread,
        Some(f.alice),
        &ClientConfig::default(),
        None,
        &view,
    )
    .await
    .unwrap();
    assert_eq!(d.tree.len(), 5);
    let top = d.tree.get(&top).unwrap();
    assert_eq!(top.score, 2);
    assert_eq!(top.user_vote, Some(VoteDirection::Up));
    assert_eq!(d.thread_tally.score, 0);
}

#[tokio::test]
async fn failed_vote_leaves_the_page_as_is() {
    let f = Forum::new();
    let top = f.comment(None, 10);
    f.server
        .add_vote(VoteRecord::now(Target::Comment(top), f.bob, VoteDirection::Up));
    let view = Liveness::new();
    let config = ClientConfig::default();
    let interactions = InteractionStore::new(f.server.clone(), Some(f.alice), view.clone());
    let mut d = Discussion::load(
        &*f.server,
        f.thread,
        Some(f.alice),
        &config,
        Some(&interactions),
        &view,
    )
    .await
    .unwrap();

    f.server.fail_next(RemoteError::Network(String::from("offline")));
    let res = d
        .vote(&interactions, Target::Comment(top), VoteDirection::Down)
        .await;
    assert_eq!(
        res,
        Err(Error::Remote(RemoteError::Network(String::from("offline"))))
    );
    let node = d.tree.get(&top).unwrap();
    assert_eq!((node.score, node.user_vote), (1, None));
    let s = interactions.get_state(Target::Comment(top));
    assert_eq!((s.current.score, s.current.vote), (1, None));
    assert!(f.server.votes_of(f.alice, Target::Comment(top)).is_empty());
}

#[tokio::test]
async fn submitting_requires_a_signed_in_valid_comment() {
    let f = Forum::new();
    let top = f.comment(None, 10);
    let view = Liveness::new();
    let config = ClientConfig::default();
    let mut d = Discussion::load(&*f.server, f.thread, None, &config, None, &view)
        .await
        .unwrap();
    let calls = f.server.num_calls();

    let res = d
        .submit_comment(&*f.server, None, Some(top), String::from("hi"), &view)
        .await;
    assert_eq!(res.map(|_| ()), Err(Error::AuthRequired));

    let res = d
        .submit_comment(&*f.server, Some(f.bob), Some(top), String::from("h\0i"), &view)
        .await;
    assert_eq!(
        res.map(|_| ()),
        Err(Error::Remote(RemoteError::NullByteInString(String::from("h\0i")))),
    );

    let missing = agora_client::api::CommentId(uuid::Uuid::new_v4());
    let res = d
        .submit_comment(&*f.server, Some(f.bob), Some(missing), String::from("hi"), &view)
        .await;
    assert_eq!(res.map(|_| ()), Err(Error::ParentNotFound(missing)));

    assert_eq!(f.server.num_calls(), calls);
    assert_eq!(d.tree.len(), 1);
}

#[tokio::test]
async fn failed_vote_fetch_shows_zero_scores() {
    let f = Forum::new();
    let top = f.comment(None, 10);
    f.server
        .add_vote(VoteRecord::now(Target::Comment(top), f.bob, VoteDirection::Up));

    f.server.succeed_next();
    f.server
        .fail_next(RemoteError::Network(String::from("timeout")));
    let d = Discussion::load(
        &*f.server,
        f.thread,
        Some(f.alice),
        &ClientConfig::default(),
        None,
        &Liveness::new(),
    )
    .await
    .unwrap();
    assert_eq!(d.tree.get(&top).unwrap().score, 0);
    assert_eq!(d.thread_tally.score, 0);
}

#[tokio::test]
async fn failed_comment_fetch_is_an_error() {
    let f = Forum::new();
    f.server.fail_next(RemoteError::PermissionDenied);
    let res = Discussion::load(
        &*f.server,
        f.thread,
        None,
        &ClientConfig::default(),
        None,
        &Liveness::new(),
    )
    .await;
    assert_eq!(
        res.map(|_| ()),
        Err(Error::Remote(RemoteError::PermissionDenied))
    );
}

#[tokio::test]
async fn corrupted_comments_leave_the_rest_displayed() {
    let f = Forum::new();
    let good = f.comment(None, 10);

    // a -> b -> a
    let a = agora_client::api::CommentId(uuid::Uuid::new_v4());
    let b = f.comment(Some(a), 20);
    let mut ca = agora_client::api::CommentRecord::now(
        agora_client::api::Author::new(f.bob, String::from("bob")),
        f.thread,
        Some(b),
        String::from("loop"),
    );
    ca.id = a;
    f.server.add_comment(ca);

    let d = Discussion::load(
        &*f.server,
        f.thread,
        None,
        &ClientConfig::default(),
        None,
        &Liveness::new(),
    )
    .await
    .unwrap();
    assert_eq!(d.tree.walk().map(|n| n.id()).collect::<Vec<_>>(), vec![good]);
    assert_eq!(d.errors, vec![Error::CyclicReference(std::cmp::min(a, b))]);
}

#[tokio::test]
async fn torn_down_view_discards_the_load() {
    let f = Forum::new();
    f.comment(None, 10);
    let view = Liveness::new();
    let config = ClientConfig::default();
    let (res, ()) = tokio::join!(
        Discussion::load(&*f.server, f.thread, None, &config, None, &view),
        async { view.tear_down() },
    );
    assert_eq!(res.map(|_| ()), Err(Error::Discarded));
}

#[tokio::test]
async fn torn_down_view_discards_the_load_with_interactions() {
    let f = Forum::new();
    f.comment(None, 10);
    let view = Liveness::new();
    let config = ClientConfig::default();
    let interactions = InteractionStore::new(f.server.clone(), Some(f.alice), view.clone());
    let (res, ()) = tokio::join!(
        Discussion::load(
            &*f.server,
            f.thread,
            Some(f.alice),
            &config,
            Some(&interactions),
            &view,
        ),
        async { view.tear_down() },
    );
    assert_eq!(res.map(|_| ()), Err(Error::Discarded));
    assert_eq!(
        interactions.get_state(Target::Thread(f.thread)),
        Default::default()
    );
}

#[tokio::test]
async fn thread_list_ranks_and_reranks() {
    let server = std::sync::Arc::new(MockServer::new());
    let alice = server.add_user("alice");
    let bob = server.add_user("bob");
    let community = agora_client::api::CommunityId::stub();
    let quiet = server.add_thread(alice, community, "quiet");
    let popular = server.add_thread(bob, community, "popular");
    let newest = server.add_thread(alice, community, "newest");
    server
        .cast_vote(Target::Thread(popular), alice, VoteDirection::Up)
        .await
        .unwrap();
    server
        .cast_vote(Target::Thread(popular), bob, VoteDirection::Up)
        .await
        .unwrap();
    server
        .cast_vote(Target::Thread(quiet), bob, VoteDirection::Up)
        .await
        .unwrap();

    let view = Liveness::new();
    let mut list = ThreadList::load(&*server, ThreadScope::All, RankMode::Top, &view)
        .await
        .unwrap();
    let ids = |l: &ThreadList| l.threads().iter().map(|t| t.id).collect::<Vec<_>>();
    assert_eq!(ids(&list), vec![popular, quiet, newest]);

    list.set_mode(RankMode::New);
    assert_eq!(list.mode(), RankMode::New);
    assert_eq!(ids(&list), vec![newest, popular, quiet]);

    let mine = ThreadList::load(&*server, ThreadScope::User(bob), RankMode::New, &view)
        .await
        .unwrap();
    assert_eq!(ids(&mine), vec![popular]);
}
