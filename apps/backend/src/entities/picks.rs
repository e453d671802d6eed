use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "picks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "room_id")]
    pub room_id: i64,
    #[sea_orm(column_name = "season_game_id")]
    pub season_game_id: i64,
    #[sea_orm(column_name = "participant_id")]
    pub participant_id: i64,
    #[sea_orm(column_name = "pick_number", column_type = "SmallInteger")]
    pub pick_number: i16,
    #[sea_orm(column_name = "picked_at")]
    pub picked_at: OffsetDateTime,
    #[sea_orm(column_name = "undo_deadline")]
    pub undo_deadline: OffsetDateTime,
    #[sea_orm(column_name = "undone_at")]
    pub undone_at: Option<OffsetDateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::rooms::Entity",
        from = "Column::RoomId",
        to = "super::rooms::Column::Id"
    )]
    Room,
    #[sea_orm(
        belongs_to = "super::season_games::Entity",
        from = "Column::SeasonGameId",
        to = "super::season_games::Column::Id"
    )]
    SeasonGame,
    #[sea_orm(
        belongs_to = "super::participants::Entity",
        from = "Column::ParticipantId",
        to = "super::participants::Column::Id"
    )]
    Participant,
}

impl Related<super::rooms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl Related<super::season_games::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SeasonGame.def()
    }
}

impl Related<super::participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
