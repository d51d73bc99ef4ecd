mod test_media_trigger;
