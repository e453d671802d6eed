use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;
use sea_orm_migration::sea_query::{ColumnDef, ForeignKeyAction, Index, Table};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Rooms {
    Table,
    Id,
    Code,
    Status,
    FirstPickerId,
    TotalTurns,
    CreatedAt,
    UpdatedAt,
    ExpiresAt,
    LockVersion,
}

#[derive(Iden)]
enum Participants {
    Table,
    Id,
    RoomId,
    DisplayName,
    Seat,
    SessionHash,
    JoinedAt,
}

#[derive(Iden)]
enum SeasonGames {
    Table,
    Id,
    RoomId,
    Opponent,
    Venue,
    GameDate,
    GameTime,
    IsMarquee,
    IsFamily,
}

#[derive(Iden)]
enum Picks {
    Table,
    Id,
    RoomId,
    SeasonGameId,
    ParticipantId,
    PickNumber,
    PickedAt,
    UndoDeadline,
    UndoneAt,
}

// Partial unique indexes share syntax between Postgres and SQLite.
const ACTIVE_PICK_INDEXES: [&str; 2] = [
    "CREATE UNIQUE INDEX IF NOT EXISTS picks_room_number_active_key \
     ON picks (room_id, pick_number) WHERE undone_at IS NULL",
    "CREATE UNIQUE INDEX IF NOT EXISTS picks_room_game_active_key \
     ON picks (room_id, season_game_id) WHERE undone_at IS NULL",
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Rooms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rooms::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(Rooms::Code).string_len(6).not_null())
                    .col(
                        ColumnDef::new(Rooms::Status)
                            .string_len(16)
                            .not_null()
                            .default("waiting")
                            .check(Expr::col(Rooms::Status).is_in([
                                "waiting",
                                "coin_toss",
                                "drafting",
                                "complete",
                            ])),
                    )
                    .col(ColumnDef::new(Rooms::FirstPickerId).big_integer().null())
                    .col(
                        ColumnDef::new(Rooms::TotalTurns)
                            .small_integer()
                            .not_null()
                            .default(18),
                    )
                    .col(
                        ColumnDef::new(Rooms::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rooms::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rooms::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rooms::LockVersion)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("rooms_code_key")
                    .table(Rooms::Table)
                    .col(Rooms::Code)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Participants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Participants::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(
                        ColumnDef::new(Participants::RoomId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Participants::DisplayName)
                            .string_len(30)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Participants::Seat)
                            .small_integer()
                            .not_null()
                            .check(Expr::col(Participants::Seat).is_in([1, 2])),
                    )
                    .col(
                        ColumnDef::new(Participants::SessionHash)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Participants::JoinedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("participants_room_id_fkey")
                            .from(Participants::Table, Participants::RoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("participants_room_seat_key")
                    .table(Participants::Table)
                    .col(Participants::RoomId)
                    .col(Participants::Seat)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("participants_session_hash_key")
                    .table(Participants::Table)
                    .col(Participants::SessionHash)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SeasonGames::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SeasonGames::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(
                        ColumnDef::new(SeasonGames::RoomId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SeasonGames::Opponent).string().not_null())
                    .col(ColumnDef::new(SeasonGames::Venue).string().not_null())
                    .col(ColumnDef::new(SeasonGames::GameDate).date().not_null())
                    .col(ColumnDef::new(SeasonGames::GameTime).time().not_null())
                    .col(
                        ColumnDef::new(SeasonGames::IsMarquee)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(SeasonGames::IsFamily)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("season_games_room_id_fkey")
                            .from(SeasonGames::Table, SeasonGames::RoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("season_games_room_date_idx")
                    .table(SeasonGames::Table)
                    .col(SeasonGames::RoomId)
                    .col(SeasonGames::GameDate)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Picks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Picks::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(Picks::RoomId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Picks::SeasonGameId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Picks::ParticipantId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Picks::PickNumber)
                            .small_integer()
                            .not_null()
                            .check(Expr::col(Picks::PickNumber).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Picks::PickedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Picks::UndoDeadline)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Picks::UndoneAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("picks_room_id_fkey")
                            .from(Picks::Table, Picks::RoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("picks_season_game_id_fkey")
                            .from(Picks::Table, Picks::SeasonGameId)
                            .to(SeasonGames::Table, SeasonGames::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("picks_participant_id_fkey")
                            .from(Picks::Table, Picks::ParticipantId)
                            .to(Participants::Table, Participants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("picks_room_number_idx")
                    .table(Picks::Table)
                    .col(Picks::RoomId)
                    .col(Picks::PickNumber)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        let conn = manager.get_connection();
        for sql in ACTIVE_PICK_INDEXES {
            conn.execute_unprepared(sql).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Picks::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(SeasonGames::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(Participants::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Rooms::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
