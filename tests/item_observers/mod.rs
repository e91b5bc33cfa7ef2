mod watcher_delivery;
