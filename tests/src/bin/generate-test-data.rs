use anyhow::Context;
use chrono::{Duration, Utc};
use mazhar_client::{
    api::{ArticleId, CommentId, NewComment, Time},
    forest, Comment, CommentStore, Forest, MemoryPersistence, Persistence, Snapshot,
};
use rand::{seq::SliceRandom, Rng};

const ARTICLES: &[&str] = &[
    "sessizligin-sesi",
    "istanbulda-bir-sabah",
    "kayip-mektuplar",
    "denizin-oteki-yakasi",
];
const AUTHORS: &[&str] = &[
    "Ayşe Yılmaz",
    "Mehmet Kaya",
    "Zeynep Demir",
    "Can Öztürk",
    "Elif Şahin",
    "Ada Lovelace",
];

const COMMENTS_PER_ARTICLE: usize = 40;
const REPLY_PROBABILITY: f64 = 0.6;
const EDIT_PROBABILITY: f64 = 0.1;
const MAX_LIKES: u64 = 25;
const COMMENT_WORD_COUNT: usize = 30;

fn gen_input(rng: &mut impl Rng) -> NewComment {
    let name = AUTHORS.choose(rng).copied().unwrap_or("Anonim");
    let email = format!(
        "{}@example.org",
        name.split_whitespace().next().unwrap_or("anonim").to_lowercase()
    );
    let words = rng.gen_range(3..COMMENT_WORD_COUNT);
    NewComment::new(String::from(name), email, lipsum::lipsum_words(words))
}

fn gen_article(rng: &mut impl Rng, article: &ArticleId, start: Time) -> anyhow::Result<Forest> {
    let mut forest = Forest::new();
    let mut ids: Vec<CommentId> = Vec::new();
    let mut now = start;
    for _ in 0..COMMENTS_PER_ARTICLE {
        now = now + Duration::minutes(rng.gen_range(1..600));
        let parent = match ids.is_empty() || !rng.gen_bool(REPLY_PROBABILITY) {
            true => None,
            false => ids.choose(rng).cloned(),
        };
        let mut comment = Comment::new(article.clone(), parent.clone(), gen_input(rng), now);
        comment.likes = rng.gen_range(0..=MAX_LIKES);
        if rng.gen_bool(EDIT_PROBABILITY) {
            comment.is_edited = true;
            comment.edited_at = Some(now + Duration::minutes(rng.gen_range(1..60)));
        }
        ids.push(comment.id.clone());
        match parent {
            None => forest.push_back(comment),
            Some(p) => {
                forest = forest::insert_reply(&forest, &p, comment)
                    .context("replying to a comment generated earlier")?
            }
        }
    }
    Ok(forest)
}

fn main() -> anyhow::Result<()> {
    let mut rng = rand::thread_rng();
    let start = Utc::now() - Duration::days(30);

    let mut snapshot = Snapshot::new();
    for slug in ARTICLES {
        let article = ArticleId::from(*slug);
        let forest = gen_article(&mut rng, &article, start)?;
        snapshot = snapshot.with_forest(article, forest);
    }

    // Going through a store checks that the generated data survives a reload unchanged
    let mut persistence = MemoryPersistence::new();
    persistence
        .save(&snapshot)
        .context("saving generated snapshot")?;
    let store = CommentStore::open(persistence.clone());
    anyhow::ensure!(
        store.snapshot() == snapshot,
        "generated snapshot did not survive a reload"
    );

    let data = persistence
        .contents()
        .context("memory persistence lost the generated snapshot")?;
    println!("{data}");
    Ok(())
}
