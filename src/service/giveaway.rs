//! Giveaway lifecycle: announce, join, end and reroll.
//!
//! A giveaway is active from the moment it is announced until exactly one of the
//! in-process timer, the minute sweep or a manual `/giveaway end` deactivates it.
//! Whoever wins that race draws and announces the winners; everyone else is a no-op.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use rand::{seq::SliceRandom, Rng};
use sea_orm::DatabaseConnection;
use serenity::{
    all::{
        ButtonStyle, ChannelId, CreateActionRow, CreateButton, CreateEmbed, CreateMessage,
        EditMessage, MessageId, User,
    },
    http::Http,
};

use crate::{
    data::giveaway::GiveawayRepository,
    error::AppError,
    model::giveaway::{CreateGiveawayParam, Giveaway},
    service::embed,
    util::time::{full_time, relative_time},
};

/// Custom id of the join button on every announcement.
pub const JOIN_BUTTON_ID: &str = "join_giveaway";

/// Picks up to `count` distinct winners uniformly at random.
///
/// Shuffles a copy of the participants with Fisher–Yates and keeps the first
/// `count`, so every subset of size `min(count, participants)` is equally likely.
pub fn select_winners<R: Rng + ?Sized>(participants: &[u64], count: usize, rng: &mut R) -> Vec<u64> {
    let mut pool = participants.to_vec();
    pool.shuffle(rng);
    pool.truncate(count);
    pool
}

fn mentions(ids: &[u64]) -> String {
    ids.iter()
        .map(|id| format!("<@{}>", id))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Announcement card and join button for a new giveaway.
pub fn announcement(
    prize: &str,
    winner_count: u32,
    duration_text: &str,
    host: &User,
    end_time: DateTime<Utc>,
) -> (CreateEmbed, CreateActionRow) {
    let card = embed::info(
        "🎉 Giveaway",
        format!(
            "**Prize:** {}\n**Winners:** {}\n**Ends:** {}",
            prize,
            winner_count,
            relative_time(end_time)
        ),
    )
    .field("🎁 Prize", prize, true)
    .field("👥 Winners", winner_count.to_string(), true)
    .field("⏱️ Duration", duration_text, true)
    .field("👤 Hosted by", host.tag(), true)
    .field("📅 Ends at", full_time(end_time), true);

    let button = CreateButton::new(JOIN_BUTTON_ID)
        .label("🎉 Join Giveaway")
        .style(ButtonStyle::Success);

    (card, CreateActionRow::Buttons(vec![button]))
}

fn ended_card(giveaway: &Giveaway, winners: &[u64]) -> CreateEmbed {
    if winners.is_empty() {
        embed::warning(
            "Giveaway Ended",
            format!(
                "**Prize:** {}\n**Winners:** {}\n\n❌ **No participants joined this giveaway.**",
                giveaway.prize, giveaway.winner_count
            ),
        )
    } else {
        embed::success(
            "🎉 Giveaway Ended",
            format!(
                "**Prize:** {}\n**Winners:** {}\n\n🎊 **Congratulations to the winners!**",
                giveaway.prize,
                mentions(winners)
            ),
        )
    }
}

fn rerolled_card(giveaway: &Giveaway, winners: &[u64]) -> CreateEmbed {
    if winners.is_empty() {
        embed::warning(
            "Giveaway Reroll",
            format!(
                "**Prize:** {}\n**Winners:** {}\n\n❌ **No participants to reroll.**",
                giveaway.prize, giveaway.winner_count
            ),
        )
    } else {
        embed::success(
            "🎉 Giveaway Rerolled",
            format!(
                "**Prize:** {}\n**New Winners:** {}\n\n🎊 **Congratulations to the new winners!**",
                giveaway.prize,
                mentions(winners)
            ),
        )
    }
}

/// Result of pressing the join button.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinOutcome {
    Joined {
        prize: String,
        end_time: DateTime<Utc>,
        participants: u64,
    },
    AlreadyJoined,
    /// Still flagged active but past its end time; the sweep has not caught it yet.
    Ended,
    /// Unknown message or already ended.
    NotActive,
}

pub struct GiveawayService<'a> {
    db: &'a DatabaseConnection,
    http: Arc<Http>,
}

impl<'a> GiveawayService<'a> {
    pub fn new(db: &'a DatabaseConnection, http: Arc<Http>) -> Self {
        Self { db, http }
    }

    /// Records an announced giveaway.
    pub async fn register(&self, param: CreateGiveawayParam) -> Result<Giveaway, AppError> {
        let giveaway = GiveawayRepository::new(self.db).create(param).await?;

        tracing::info!(
            "Giveaway {} for '{}' started in guild {}, ends {}",
            giveaway.id,
            giveaway.prize,
            giveaway.guild_id,
            giveaway.end_time
        );

        Ok(giveaway)
    }

    /// Enters a user into the giveaway announced by `message_id`.
    pub async fn join(
        &self,
        guild_id: u64,
        message_id: u64,
        user_id: u64,
        now: DateTime<Utc>,
    ) -> Result<JoinOutcome, AppError> {
        let repo = GiveawayRepository::new(self.db);

        let Some(giveaway) = repo.find_by_message_id(guild_id, message_id).await? else {
            return Ok(JoinOutcome::NotActive);
        };
        if !giveaway.active {
            return Ok(JoinOutcome::NotActive);
        }
        if !giveaway.is_open(now) {
            return Ok(JoinOutcome::Ended);
        }

        if !repo.add_participant(giveaway.id, user_id).await? {
            return Ok(JoinOutcome::AlreadyJoined);
        }

        Ok(JoinOutcome::Joined {
            participants: repo.participant_count(giveaway.id).await?,
            prize: giveaway.prize,
            end_time: giveaway.end_time,
        })
    }

    /// Deactivates a giveaway and draws its winners.
    ///
    /// # Returns
    /// - `Ok(Some(winners))` - This call ended the giveaway; empty without participants
    /// - `Ok(None)` - Already ended by someone else, nothing to announce
    /// - `Err(AppError)` - Database error
    pub async fn close(&self, giveaway: &Giveaway) -> Result<Option<Vec<u64>>, AppError> {
        let repo = GiveawayRepository::new(self.db);

        if !repo.deactivate(giveaway.id).await? {
            return Ok(None);
        }

        let participants = repo.participants(giveaway.id).await?;
        let winners = select_winners(
            &participants,
            giveaway.winner_count as usize,
            &mut rand::rng(),
        );

        Ok(Some(winners))
    }

    /// Ends a giveaway and announces the result.
    ///
    /// Safe to call more than once; only the first call announces.
    pub async fn end(&self, giveaway: &Giveaway) -> Result<Option<Vec<u64>>, AppError> {
        let Some(winners) = self.close(giveaway).await? else {
            tracing::debug!("Giveaway {} was already ended", giveaway.id);
            return Ok(None);
        };

        tracing::info!(
            "Giveaway {} ended with {} winner(s)",
            giveaway.id,
            winners.len()
        );

        let channel_id = ChannelId::new(giveaway.channel_id);
        channel_id
            .edit_message(
                &self.http,
                MessageId::new(giveaway.message_id),
                EditMessage::new()
                    .embed(ended_card(giveaway, &winners))
                    .components(vec![]),
            )
            .await?;

        let announcement = if winners.is_empty() {
            format!(
                "The giveaway for **{}** has ended with no participants.",
                giveaway.prize
            )
        } else {
            format!(
                "🎉 Congratulations {}! You won **{}**!",
                mentions(&winners),
                giveaway.prize
            )
        };
        channel_id
            .send_message(&self.http, CreateMessage::new().content(announcement))
            .await?;

        Ok(Some(winners))
    }

    /// Ends an active giveaway before its end time.
    ///
    /// # Returns
    /// - `Ok(())` - Giveaway ended and announced
    /// - `Err(AppError::NotFound)` - No giveaway for that message in this guild
    /// - `Err(AppError::BadRequest)` - The giveaway has already ended
    pub async fn end_early(&self, guild_id: u64, message_id: u64) -> Result<(), AppError> {
        let giveaway = self.find(guild_id, message_id).await?;

        if !giveaway.active || self.end(&giveaway).await?.is_none() {
            return Err(AppError::BadRequest(
                "This giveaway has already ended.".to_string(),
            ));
        }

        Ok(())
    }

    /// Draws a fresh set of winners from the stored participants.
    ///
    /// Works whether or not the giveaway is still active.
    pub async fn draw_again(
        &self,
        guild_id: u64,
        message_id: u64,
    ) -> Result<(Giveaway, Vec<u64>), AppError> {
        let giveaway = self.find(guild_id, message_id).await?;
        let participants = GiveawayRepository::new(self.db)
            .participants(giveaway.id)
            .await?;

        let winners = select_winners(
            &participants,
            giveaway.winner_count as usize,
            &mut rand::rng(),
        );

        Ok((giveaway, winners))
    }

    /// Rerolls a giveaway and announces the new winners.
    pub async fn reroll(&self, guild_id: u64, message_id: u64) -> Result<Vec<u64>, AppError> {
        let (giveaway, winners) = self.draw_again(guild_id, message_id).await?;
        let channel_id = ChannelId::new(giveaway.channel_id);

        channel_id
            .edit_message(
                &self.http,
                MessageId::new(giveaway.message_id),
                EditMessage::new().embed(rerolled_card(&giveaway, &winners)),
            )
            .await?;

        if !winners.is_empty() {
            channel_id
                .send_message(
                    &self.http,
                    CreateMessage::new().content(format!(
                        "🎉 New winners: {}! You won **{}**!",
                        mentions(&winners),
                        giveaway.prize
                    )),
                )
                .await?;
        }

        tracing::info!("Giveaway {} rerolled", giveaway.id);

        Ok(winners)
    }

    /// Ends every active giveaway whose end time has passed.
    ///
    /// A failure on one giveaway is logged and does not stop the others.
    pub async fn end_overdue(&self, now: DateTime<Utc>) -> Result<usize, AppError> {
        let overdue = GiveawayRepository::new(self.db).get_overdue(now).await?;
        let mut ended = 0;

        for giveaway in &overdue {
            match self.end(giveaway).await {
                Ok(Some(_)) => ended += 1,
                Ok(None) => {}
                Err(e) => tracing::error!("Failed to end giveaway {}: {:?}", giveaway.id, e),
            }
        }

        Ok(ended)
    }

    async fn find(&self, guild_id: u64, message_id: u64) -> Result<Giveaway, AppError> {
        GiveawayRepository::new(self.db)
            .find_by_message_id(guild_id, message_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Could not find a giveaway for that message.".to_string()))
    }
}

/// Arms the in-process timer that ends a giveaway at its end time.
///
/// A giveaway already past its end fires immediately.
pub fn arm_timer(db: DatabaseConnection, http: Arc<Http>, giveaway: &Giveaway) {
    let guild_id = giveaway.guild_id;
    let message_id = giveaway.message_id;
    let delay = (giveaway.end_time - Utc::now())
        .to_std()
        .unwrap_or(Duration::ZERO);

    tokio::spawn(async move {
        tokio::time::sleep(delay).await;

        let service = GiveawayService::new(&db, http);
        let giveaway = match service.find(guild_id, message_id).await {
            Ok(giveaway) => giveaway,
            Err(e) => {
                tracing::error!("Failed to load giveaway {} at end time: {:?}", message_id, e);
                return;
            }
        };

        if let Err(e) = service.end(&giveaway).await {
            tracing::error!("Failed to end giveaway {}: {:?}", message_id, e);
        }
    });
}

/// Re-arms the timers of every active giveaway, e.g. after a restart.
pub async fn resume_timers(db: &DatabaseConnection, http: Arc<Http>) -> Result<usize, AppError> {
    let active = GiveawayRepository::new(db).get_active().await?;

    for giveaway in &active {
        arm_timer(db.clone(), http.clone(), giveaway);
    }

    Ok(active.len())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::Duration as ChronoDuration;
    use rand::{rngs::StdRng, SeedableRng};
    use test_utils::{
        builder::TestBuilder,
        factory::{create_entry, giveaway::GiveawayFactory},
    };

    use super::*;

    fn service(db: &DatabaseConnection) -> GiveawayService<'_> {
        GiveawayService::new(db, Arc::new(Http::new("test-token")))
    }

    #[test]
    fn winners_are_distinct_participants() {
        let participants: Vec<u64> = (1..=10).collect();
        let mut rng = StdRng::seed_from_u64(7);

        for count in [1, 3, 10, 15] {
            let winners = select_winners(&participants, count, &mut rng);
            let unique: HashSet<u64> = winners.iter().copied().collect();

            assert_eq!(winners.len(), count.min(participants.len()));
            assert_eq!(unique.len(), winners.len());
            assert!(winners.iter().all(|id| participants.contains(id)));
        }
    }

    #[test]
    fn no_participants_means_no_winners() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(select_winners(&[], 3, &mut rng).is_empty());
    }

    #[test]
    fn every_participant_can_win() {
        let participants = [1u64, 2, 3, 4];
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = [0usize; 4];

        for _ in 0..4_000 {
            let winner = select_winners(&participants, 1, &mut rng)[0];
            seen[(winner - 1) as usize] += 1;
        }

        // Each should land near 1000; a biased shuffle skews well past this band.
        assert!(seen.iter().all(|count| (850..=1150).contains(count)), "{seen:?}");
    }

    /// Tests closing a giveaway twice.
    ///
    /// Verifies that the second close, as when the timer fires after a manual end,
    /// draws nothing.
    ///
    /// Expected: Some(winners) then None
    #[tokio::test]
    async fn closing_twice_is_a_no_op() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_giveaway_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let row = GiveawayFactory::new(db).winner_count(2).build().await?;
        create_entry(db, row.id, 11).await?;
        create_entry(db, row.id, 12).await?;
        create_entry(db, row.id, 13).await?;
        let giveaway = Giveaway::from_entity(row)?;

        let service = service(db);
        let first = service.close(&giveaway).await?.unwrap();
        assert_eq!(first.len(), 2);

        assert_eq!(service.close(&giveaway).await?, None);

        Ok(())
    }

    /// Tests closing a giveaway nobody joined.
    ///
    /// Expected: Some(empty)
    #[tokio::test]
    async fn closing_without_participants_has_no_winners() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_giveaway_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let giveaway = Giveaway::from_entity(GiveawayFactory::new(db).build().await?)?;

        assert_eq!(service(db).close(&giveaway).await?, Some(vec![]));

        Ok(())
    }

    /// Tests joining an open giveaway twice.
    ///
    /// Expected: Joined with one participant, then AlreadyJoined
    #[tokio::test]
    async fn joining_twice_is_refused() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_giveaway_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let row = GiveawayFactory::new(db)
            .message_id(900)
            .guild_id(10)
            .build()
            .await?;
        let service = service(db);
        let now = Utc::now();

        match service.join(10, 900, 5, now).await? {
            JoinOutcome::Joined { participants, prize, .. } => {
                assert_eq!(participants, 1);
                assert_eq!(prize, row.prize);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(service.join(10, 900, 5, now).await?, JoinOutcome::AlreadyJoined);

        Ok(())
    }

    /// Tests joining closed or unknown giveaways.
    ///
    /// Expected: NotActive for ended and unknown, Ended for past end time
    #[tokio::test]
    async fn joining_closed_giveaways_is_refused() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_giveaway_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        GiveawayFactory::new(db)
            .message_id(1)
            .guild_id(10)
            .active(false)
            .build()
            .await?;
        GiveawayFactory::new(db)
            .message_id(2)
            .guild_id(10)
            .end_time(Utc::now() - ChronoDuration::minutes(1))
            .build()
            .await?;

        let service = service(db);
        let now = Utc::now();

        assert_eq!(service.join(10, 1, 5, now).await?, JoinOutcome::NotActive);
        assert_eq!(service.join(10, 2, 5, now).await?, JoinOutcome::Ended);
        assert_eq!(service.join(10, 3, 5, now).await?, JoinOutcome::NotActive);

        Ok(())
    }

    /// Tests rerolling an ended giveaway.
    ///
    /// Expected: Ok with one winner drawn from the stored participants
    #[tokio::test]
    async fn reroll_draws_from_ended_giveaway() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_giveaway_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let row = GiveawayFactory::new(db)
            .message_id(77)
            .guild_id(10)
            .active(false)
            .build()
            .await?;
        create_entry(db, row.id, 31).await?;
        create_entry(db, row.id, 32).await?;

        let (giveaway, winners) = service(db).draw_again(10, 77).await?;

        assert!(!giveaway.active);
        assert_eq!(winners.len(), 1);
        assert!([31, 32].contains(&winners[0]));

        Ok(())
    }

    /// Tests ending or rerolling a giveaway from a different guild.
    ///
    /// Verifies that a message id pasted into another guild resolves to nothing
    /// and that the giveaway stays active.
    ///
    /// Expected: NotFound for both, giveaway still active
    #[tokio::test]
    async fn other_guilds_cannot_end_or_reroll() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_giveaway_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let row = GiveawayFactory::new(db)
            .message_id(555)
            .guild_id(1)
            .build()
            .await?;
        create_entry(db, row.id, 31).await?;

        let service = service(db);

        assert!(matches!(
            service.draw_again(2, 555).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.end_early(2, 555).await,
            Err(AppError::NotFound(_))
        ));

        let stored = GiveawayRepository::new(db)
            .find_by_message_id(1, 555)
            .await?
            .unwrap();
        assert!(stored.active);

        Ok(())
    }
}
