pub mod provision_user_dto;
