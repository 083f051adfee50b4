use knowcodeextra::admin::{CallsignSearch, QueueTriage};
use knowcodeextra::models::AnswerOption;
use knowcodeextra::utils::logging;
use knowcodeextra::{AdminClient, Config, ExamClient, ExamSession, SubmitOutcome, View};

#[tokio::test]
#[ignore] // 默认忽略，需要本地后端：cargo test -- --ignored
async fn test_fetch_tests_and_questions() {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();

    let client = ExamClient::new(&config);
    let tests = client.tests().await.expect("拉取考试列表失败");
    assert!(!tests.is_empty(), "服务端应该至少有一套考试");

    let questions = client
        .questions(&tests[0].id)
        .await
        .expect("拉取题目失败");
    println!("考试 {} 共 {} 道题", tests[0].id, questions.len());
}

#[tokio::test]
#[ignore]
async fn test_full_exam_session_flow() {
    logging::init();

    let config = Config::from_env();
    let client = ExamClient::new(&config);

    let mut session = ExamSession::new(&client);
    session.set_callsign("W6JSV");

    let tests = session.begin_examination().await.expect("进入选择页失败");
    let test_id = tests[0].id.clone();

    session.request_start(&test_id).expect("请求开始失败");
    session.confirm_start().await.expect("确认开始失败");
    assert_eq!(session.view(), View::Test);

    // 模拟听完整段音频
    session.playback_tick(10.0, 600.0);
    session.playback_finished();

    // 全部答 A
    let question_ids: Vec<String> =
        session.questions().iter().map(|q| q.id.clone()).collect();
    for id in &question_ids {
        session.record_answer(id, AnswerOption::A).expect("答题失败");
    }
    session
        .set_copy_text("CQ CQ DE W1AW W1AW K")
        .expect("抄收失败");

    assert!(session.can_submit());

    // 当天已考过时会被拦截，两种结果都是合法的
    match session.submit().await.expect("提交失败") {
        SubmitOutcome::Completed(result) => {
            assert_eq!(session.view(), View::Results);
            println!("判分: {}/{}", result.score, result.passing_score);
        }
        SubmitOutcome::Blocked(message) => {
            assert_eq!(session.view(), View::Blocked);
            assert!(!message.is_empty(), "拦截响应应该带原文说明");
        }
    }
}

#[tokio::test]
#[ignore]
async fn test_public_aggregates() {
    logging::init();

    let config = Config::from_env();
    let client = ExamClient::new(&config);

    let stats = client.stats().await.expect("拉取统计失败");
    println!("总尝试 {} 次", stats.total_attempts);

    let leaderboard = client.leaderboard(20).await.expect("拉取排行榜失败");
    println!("排行榜 {} 条", leaderboard.len());

    let roster = client.roster().await.expect("拉取名册失败");
    println!("名册 {} 条", roster.len());
}

#[tokio::test]
#[ignore]
async fn test_admin_login_and_queue() {
    logging::init();

    let config = Config::from_env();
    let client = AdminClient::new(&config);

    let session = client
        .login(&config.admin_username, &config.admin_password)
        .await
        .expect("管理端登录失败");
    assert!(!session.is_expired());

    let stats = client.stats(&session).await.expect("拉取仪表盘失败");
    println!("待审 {} 条, 证书共 {} 张", stats.pending_count, stats.total_certificates);

    let mut triage = QueueTriage::new();
    let pending = triage
        .refresh(&client, &session)
        .await
        .expect("拉取队列失败");
    println!("队列 {} 条", pending);
}

#[tokio::test]
#[ignore]
async fn test_admin_search_grouping() {
    logging::init();

    let config = Config::from_env();
    let client = AdminClient::new(&config);
    let session = client
        .login(&config.admin_username, &config.admin_password)
        .await
        .expect("管理端登录失败");

    let mut search = CallsignSearch::new();
    let hits = search.run(&client, &session, "W").await.expect("搜索失败");
    let groups = search.grouped();

    // 每个呼号恰好一个簇
    let total: usize = groups.iter().map(|(_, cluster)| cluster.len()).sum();
    assert_eq!(total, hits);
    println!("{} 条命中, {} 个呼号", hits, groups.len());
}
